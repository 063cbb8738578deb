mod common;
mod penalty;
mod preference;
mod properties;
mod ranking;
