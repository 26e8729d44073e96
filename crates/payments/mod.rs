pub mod mobile_money_client;
pub mod token_cache;
