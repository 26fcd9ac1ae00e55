pub mod osb;
