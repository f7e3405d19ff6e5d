mod sas_token;
mod shared_key;
