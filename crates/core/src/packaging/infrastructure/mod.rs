pub mod directory_bundle;
