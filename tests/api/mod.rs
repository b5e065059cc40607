mod auth_tests;
mod graph_tests;
mod health_tests;
mod message_tests;
