//! System prompts for the suggestion and sentiment calls.

/// System prompt for URL suggestion.
pub const SUGGEST_URLS_PROMPT: &str = "You help find URLs that likely contain historical price trends for a product/category. \
Return strict JSON only, no extra text. \
JSON shape: {\"results\":[{\"url\":\"...\",\"title\":\"...\",\"rationale\":\"...\"}]} \
Prefer pages with explicit year-by-year prices, charts, or 'price history' tables. \
Good keywords: 'price history', 'historical price', 'by year', 'chart', 'average ticket price by year'. \
Avoid paywalled or login-only sources like Statista, Ticketmaster account-only, Songkick sign-in pages. \
Prefer extractable sources like CNET, MacRumors, The Verge, Tom's Hardware, Macworld, Investopedia, KBB, PriceCharting, manufacturer and reputable blogs.";

/// System prompt for demand sentiment.
pub const SENTIMENT_PROMPT: &str = "You are a market analyst. Analyze public sentiment regarding demand for the given topic. \
Return strictly a JSON object with fields: \
{ \"topic\": string, \"overallSentiment\": \"positive|negative|mixed|neutral\", \
\"demandLevel\": \"high|medium|low\" (optional), \"confidence\": number 0-1 (optional), \
\"timeWindow\": string (optional), \"keyDrivers\": string[] (optional), \
\"summary\": string, \"sources\": [{\"url\": string, \"note\"?: string}] (optional) }";

/// User message for URL suggestion.
pub fn format_suggest_prompt(query: &str, max: usize) -> String {
    format!("Query: {}\nReturn up to {} results.", query, max)
}

/// User message for demand sentiment.
pub fn format_sentiment_prompt(topic: &str) -> String {
    format!("Topic: {}\nBe concise but complete.", topic)
}
