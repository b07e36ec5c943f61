pub mod capture_region;
