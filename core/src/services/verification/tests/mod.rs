mod mocks;
mod rate_limiter_tests;
