pub mod autocomplete_cache;
