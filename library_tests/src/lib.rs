//! End to end tests against running services, enabled with the `system_tests` feature.
//! Service locations come from `BOOKS_URL`, `RATINGS_URL` and `LOANS_URL`.
