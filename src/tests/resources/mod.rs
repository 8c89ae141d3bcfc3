mod action_tests;
mod node_tests;
mod session_tests;
mod storage_tests;
