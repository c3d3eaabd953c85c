mod export_tests;
mod monitor_tests;
mod registry_tests;
mod tailing_tests;
