pub mod nalda;
