mod product;

pub use product::{NewProductRecord, Product, ProductChangeset, ProductDocument, ProductRecord};
