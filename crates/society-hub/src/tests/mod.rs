mod common;
mod tenancy;
