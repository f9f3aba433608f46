pub mod library_ops;
