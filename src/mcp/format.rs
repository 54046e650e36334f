//! mcp::format
//!
//! Textual rendering of tool results.
//!
//! # Design
//!
//! Each result is a fixed sequence of sections: a header naming the tool,
//! the execution status, optional structured data, captured output,
//! captured error output, and a contextual hint. Agents read this as
//! markdown, so data and output are fenced.

use super::tools::ToolOutcome;

/// Render one tool result for the `tools/call` response.
pub fn tool_result(tool: &str, outcome: &ToolOutcome) -> String {
    let mut sections: Vec<String> = Vec::new();

    sections.push(format!(
        "=== {} ===\n",
        tool.replace('_', " ").to_uppercase()
    ));

    if outcome.success {
        sections.push("**Status**: SUCCESS".to_string());
    } else {
        sections.push("**Status**: FAILED".to_string());
        if let Some(code) = outcome.exit_code {
            sections.push(format!("**Exit Code**: {}", code));
        }
    }

    if let Some(data) = &outcome.data {
        sections.push("\n**Structured Data**:".to_string());
        let formatted =
            serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
        sections.push(format!("```json\n{}\n```", formatted));
    }

    if !outcome.output.trim().is_empty() {
        sections.push("\n**Output**:".to_string());
        sections.push(format!("```\n{}\n```", outcome.output.trim()));
    }

    if let Some(error) = &outcome.error {
        if !error.trim().is_empty() {
            sections.push("\n**Error Output**:".to_string());
            sections.push(format!("```\n{}\n```", error.trim()));
        }
    }

    if let Some(help) = help_text(tool, outcome.success) {
        sections.push("\n**Help**:".to_string());
        sections.push(help.to_string());
    }

    sections.join("\n")
}

/// Contextual hint appended after the result.
fn help_text(tool: &str, success: bool) -> Option<&'static str> {
    if !success {
        let hint = match tool {
            "container_list" => {
                "If no containers are found, try creating one first with `container_create` or `container_run`."
            }
            "image_list" => {
                "If no images are found, try pulling one first with `image_pull` (e.g., `ubuntu:latest`)."
            }
            "system_status" => "If the system is not running, start it with `system_start`.",
            "container_start" | "container_stop" | "container_kill" => {
                "Check that the container ID/name is correct using `container_list`."
            }
            "image_pull" => {
                "Verify the image name and tag are correct. Check your internet connection and registry access."
            }
            "registry_login" => "Verify your credentials and that the registry URL is correct.",
            _ => "Check the command parameters and ensure the container system is running.",
        };
        return Some(hint);
    }

    match tool {
        "container_create" => {
            Some("Container created successfully. Use `container_start` to start it.")
        }
        "container_run" => {
            Some("Container is now running. Use `container_logs` to view its output.")
        }
        "image_build" => Some("Image built successfully. You can now use it with `container_run`."),
        "image_pull" => Some("Image pulled successfully. You can now use it with `container_run`."),
        "system_start" => {
            Some("Container system started. You can now create and run containers.")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_result_has_header_and_status() {
        let outcome = ToolOutcome {
            success: true,
            output: "web\n".to_string(),
            ..ToolOutcome::default()
        };
        let text = tool_result("container_list", &outcome);

        assert!(text.starts_with("=== CONTAINER LIST ===\n"));
        assert!(text.contains("**Status**: SUCCESS"));
        assert!(text.contains("```\nweb\n```"));
        assert!(!text.contains("Exit Code"));
    }

    #[test]
    fn failure_includes_exit_code_and_hint() {
        let outcome = ToolOutcome {
            success: false,
            exit_code: Some(1),
            error: Some("no such container: ghost".to_string()),
            ..ToolOutcome::default()
        };
        let text = tool_result("container_start", &outcome);

        assert!(text.contains("**Status**: FAILED"));
        assert!(text.contains("**Exit Code**: 1"));
        assert!(text.contains("no such container: ghost"));
        assert!(text.contains("`container_list`"));
    }

    #[test]
    fn structured_data_is_pretty_printed_json() {
        let outcome = ToolOutcome {
            success: true,
            data: Some(json!([{"id": "web"}])),
            ..ToolOutcome::default()
        };
        let text = tool_result("container_list", &outcome);

        assert!(text.contains("**Structured Data**:"));
        assert!(text.contains("```json"));
        assert!(text.contains("\"id\": \"web\""));
    }

    #[test]
    fn empty_output_sections_are_omitted() {
        let outcome = ToolOutcome {
            success: true,
            output: "   \n".to_string(),
            ..ToolOutcome::default()
        };
        let text = tool_result("builder_stop", &outcome);

        assert!(!text.contains("**Output**:"));
        assert!(!text.contains("**Error Output**:"));
        assert!(!text.contains("**Help**:"));
    }

    #[test]
    fn success_hints_only_for_known_tools() {
        let outcome = ToolOutcome {
            success: true,
            ..ToolOutcome::default()
        };
        assert!(tool_result("image_pull", &outcome).contains("**Help**:"));
        assert!(!tool_result("image_tag", &outcome).contains("**Help**:"));
    }
}
