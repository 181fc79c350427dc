pub mod citations;
pub mod memory;
pub mod queries;
pub mod tool;
pub mod websearch;

pub use citations::{Source, SourceIndex};
pub use memory::{MemoryClient, MemoryEntry, MemoryOutcome, MemoryRetrieveTool, MemorySaveTool};
pub use queries::generate_queries;
pub use tool::{Metadata, Tool, ToolContext, ToolError, ToolOutput};
pub use websearch::{SearchClient, SearchHit, SearchOptions, SearchResult, WebSearchTool};
