// Thesis generators: section schemas, the response normalizer, the page catalog,
// and the per-session generation cycle behind the generator pages.
// All upstream calls go through llm_client — nothing here talks to the provider.

pub mod cycle;
pub mod handlers;
pub mod normalizer;
pub mod pages;
pub mod prompts;
pub mod schema;
