mod common;
mod dashboard;
