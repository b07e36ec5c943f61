pub mod simulated_subject;
