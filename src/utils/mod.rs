pub mod app_error;
pub mod credential;
pub mod json_excerpt;
pub mod mta_client;
pub mod validated_query;
