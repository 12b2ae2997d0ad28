mod cache;
mod config;
mod fetcher;
mod locks;
