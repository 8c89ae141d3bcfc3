pub(crate) mod api_client;
