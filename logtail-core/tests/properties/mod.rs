mod control_tests;
mod fetch_tests;
mod pipeline_tests;
