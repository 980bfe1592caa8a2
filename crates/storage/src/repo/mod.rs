pub mod comments;
mod counters;
mod likes;
