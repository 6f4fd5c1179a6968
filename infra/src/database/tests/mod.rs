mod store_error_tests;
