//! The fixed tool catalog and its prompt rendering.
//!
//! The catalog is a closed set: parsing and dispatch only recognize these
//! seven tools. Each entry names the conventional argument a single quoted
//! value binds to.

/// Description of one catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    /// The parameter a bare string argument binds to; also the entry's
    /// required argument.
    pub arg_name: &'static str,
    pub description: &'static str,
}

/// The closed tool catalog.
pub const TOOL_CATALOG: &[ToolSpec] = &[
    ToolSpec {
        name: "web_search",
        arg_name: "query",
        description: "Search the web across all configured search providers",
    },
    ToolSpec {
        name: "scholar_search",
        arg_name: "query",
        description: "Search academic and scholarly sources",
    },
    ToolSpec {
        name: "news_search",
        arg_name: "query",
        description: "Search recent news coverage",
    },
    ToolSpec {
        name: "doc_search",
        arg_name: "query",
        description: "Search technical documentation; pass \"library\" to scope it",
    },
    ToolSpec {
        name: "think",
        arg_name: "thoughts",
        description: "Record reasoning without taking any action",
    },
    ToolSpec {
        name: "conduct_research",
        arg_name: "research_topic",
        description: "Delegate a focused research topic to a sub-agent",
    },
    ToolSpec {
        name: "research_complete",
        arg_name: "summary",
        description: "Signal that research is finished, with a closing summary",
    },
];

/// Look up a catalog entry by name.
pub fn tool_spec(name: &str) -> Option<&'static ToolSpec> {
    TOOL_CATALOG.iter().find(|spec| spec.name == name)
}

/// Whether `name` belongs to the catalog.
pub fn is_catalog_tool(name: &str) -> bool {
    tool_spec(name).is_some()
}

/// The conventional parameter name for a tool, if it is in the catalog.
pub fn conventional_arg(name: &str) -> Option<&'static str> {
    tool_spec(name).map(|spec| spec.arg_name)
}

/// The deterministic tool description block appended to every orchestrator
/// prompt. Lists each tool, its signature, and the calling syntax.
pub fn tool_prompt_block() -> String {
    let mut block = String::from("Available tools:\n");
    for spec in TOOL_CATALOG {
        block.push_str(&format!(
            "- {}({}): {}\n",
            spec.name, spec.arg_name, spec.description
        ));
    }
    block.push_str(
        "\nTo call a tool, write a line of the form:\n\
         USE_TOOL: tool_name(\"argument\")\n\
         Use one line per call. Arguments may also be a JSON object, e.g.\n\
         USE_TOOL: doc_search({\"query\": \"channels\", \"library\": \"tokio\"})\n",
    );
    block
}
