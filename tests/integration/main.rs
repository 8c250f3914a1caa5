//! Integration tests

mod pipeline_test;
mod support;
