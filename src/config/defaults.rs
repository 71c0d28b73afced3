//! Default values for configuration

/// Default Qdrant gRPC URL for local development (port 6334, not 6333 REST)
pub fn default_qdrant_url() -> String {
    std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://127.0.0.1:6334".to_string())
}

/// Default collection name
pub fn default_collection_name() -> String {
    "ledgerlens_filings".to_string()
}

/// Default request timeout for remote collaborators, in seconds
pub fn default_request_timeout_secs() -> u64 {
    30
}

/// Default conversion service URL
pub fn default_conversion_url() -> String {
    std::env::var("LEDGERLENS_CONVERSION_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8070".to_string())
}

/// Structural conventions requested from the conversion service
pub fn default_conversion_instructions() -> String {
    [
        "Map ALL-CAPS bold headings to # and mixed-case bold headings to ##.",
        "Preserve the table scale annotation (e.g. 'In Millions') in every column header.",
        "Normalize (5,000) to -5000 and em-dashes to 0 in numeric cells.",
        "Append footnote text immediately after the table it annotates.",
    ]
    .join("\n")
}

/// Default embedding model served by the embedding backend
pub fn default_embedding_model() -> String {
    "BAAI/bge-small-en-v1.5".to_string()
}

/// Default embedding dimension (must match the model)
pub fn default_embedding_dimension() -> usize {
    384
}

/// Default embedding backend URL
pub fn default_embedding_url() -> String {
    std::env::var("LEDGERLENS_EMBEDDING_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:7997".to_string())
}

/// Default reranker model (cross-encoder)
pub fn default_reranker_model() -> String {
    "cross-encoder/ms-marco-MiniLM-L-6-v2".to_string()
}

/// Default reranker backend URL
pub fn default_reranker_url() -> String {
    std::env::var("LEDGERLENS_RERANKER_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:7997".to_string())
}

/// Default text-generation backend URL for query expansion
pub fn default_expansion_url() -> String {
    std::env::var("LEDGERLENS_EXPANSION_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

/// Default text-generation model for query expansion
pub fn default_expansion_model() -> String {
    "gemini-2.0-flash".to_string()
}

/// Default number of paraphrase queries derived per user query
pub fn default_max_expansions() -> usize {
    2
}

/// Default: query expansion enabled
pub fn default_expand_queries() -> bool {
    true
}

/// Default child window length in characters
pub fn default_child_window() -> usize {
    500
}

/// Default number of results returned from retrieval
pub fn default_top_k() -> usize {
    7
}

/// Default candidate pool fetched per similarity query before reranking
pub fn default_candidates() -> usize {
    30
}

/// Default: map child hits back to their parents before reranking
pub fn default_resolve_parents() -> bool {
    true
}

/// Default: density filter enabled
pub fn default_density_filter() -> bool {
    true
}

/// Pipe-character count above which a section counts as tabular
pub fn default_density_min_pipes() -> usize {
    5
}

/// Text length above which a section counts as data-dense regardless of pipes
pub fn default_density_min_chars() -> usize {
    1500
}
