mod test_support;

mod isolation_tests;
