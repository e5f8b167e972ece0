mod link_tests;
