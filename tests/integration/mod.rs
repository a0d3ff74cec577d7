pub mod event_tests;
pub mod mock_provider;
pub mod portrait_tests;
