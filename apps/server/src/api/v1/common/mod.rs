pub mod response_helpers;
