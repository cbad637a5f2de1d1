//! Tera templates for generated capability artifacts.
//!
//! Every template receives the same context: `name`, `display_name`, `description`,
//! `author` and `team`. A missing author or team renders as `TBD`. Names are
//! validated before rendering and go into JavaScript strings as-is; free text goes
//! through `json_encode`.

use anyhow::{Context, Result};
use tera::{Context as TeraContext, Tera};

use super::{CapabilityType, GenerationRequest};

const PROMPT: &str = r"# {{ display_name }}

{{ description }}

## Owner
- **Author**: {{ author }}
- **Team**: {{ team }}

## Usage

Reference this prompt in a conversation to apply it.

## Prompt

```
Carry out {{ display_name }} for the current task:

1. Analyse the code or requirement at hand
2. Suggest concrete improvements
3. Produce the matching code or configuration

Adjust the steps to the situation.
```

## Example

```
User: Please run {{ display_name }} on this module
Assistant: Sure, starting with...
```
";

const SKILL: &str = r"# {{ display_name }}

{{ description }}

## Owner
- **Author**: {{ author }}
- **Team**: {{ team }}

## When to use

Activates whenever the user asks for {{ display_name }}.

## Capabilities

1. **Detection**: recognise the situations this skill covers
2. **Analysis**: inspect the current state
3. **Recommendations**: propose improvements

## Example

```
Requests about {{ display_name }} trigger this skill automatically.
```
";

const MCP: &str = r#"#!/usr/bin/env node
/**
 * {{ display_name }}
 * {{ description }}
 *
 * Author: {{ author }}
 * Team: {{ team }}
 */

import { McpServer } from "@modelcontextprotocol/sdk/server/mcp.js";
import { StdioServerTransport } from "@modelcontextprotocol/sdk/server/stdio.js";
import { z } from "zod";

const server = new McpServer({
  name: "{{ name }}",
  version: "0.1.0",
});

server.tool("health", "Health check", async () => ({
  content: [{ type: "text", text: "{{ name }} MCP is running" }],
}));

server.tool(
  "{{ name }}_action",
  {{ display_name | json_encode() }},
  { input: z.string().describe("Input") },
  async ({ input }) => ({
    content: [{ type: "text", text: `${input}` }],
  }),
);

await server.connect(new StdioServerTransport());
"#;

const COMMAND: &str = r"# /{{ name }}

{{ display_name }} - {{ description }}

## Owner
- **Author**: {{ author }}
- **Team**: {{ team }}

## Usage

```
/{{ name }} [target]
```

## Arguments

| Argument | Type | Required | Description |
|----------|------|----------|-------------|
| target | string | no | Path or file to work on |

## Behaviour

Runs {{ display_name }}:

1. Read the current context
2. Perform the operation
3. Report the result

## Examples

```
/{{ name }}
/{{ name }} ./src
```
";

const AGENT: &str = r"# {{ display_name }}

{{ description }}

## Owner
- **Author**: {{ author }}
- **Team**: {{ team }}

## Role

You are an assistant dedicated to {{ display_name }}.

## Responsibilities

1. **Analysis**: dig into the problem
2. **Execution**: carry out the required changes
3. **Review**: suggest further improvements

## Workflow

1. Receive the request
2. Inspect the current state
3. Plan the work
4. Execute and report back

## Guidelines

- Keep changes safe and reversible
- Follow the existing code style
- Report progress as you go
";

const HOOK: &str = r#"/**
 * {{ display_name }}
 * {{ description }}
 *
 * Author: {{ author }}
 * Team: {{ team }}
 */

export default {
  name: "{{ name }}",
  description: {{ description | json_encode() }},

  // before_tool_use | after_tool_use | on_error | on_complete
  event: "after_tool_use",

  toolMatch: "*",

  async handler(context) {
    const { toolName, toolOutput } = context;
    console.log(`[{{ name }}] Tool ${toolName} executed`);
    return toolOutput;
  },
};
"#;

/// The compiled artifact templates.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (CapabilityType::Prompt.template_name(), PROMPT),
            (CapabilityType::Skill.template_name(), SKILL),
            (CapabilityType::Mcp.template_name(), MCP),
            (CapabilityType::SlashCommand.template_name(), COMMAND),
            (CapabilityType::Agent.template_name(), AGENT),
            (CapabilityType::Hook.template_name(), HOOK),
        ])
        .context("Failed to compile capability templates")?;
        tera.autoescape_on(vec![]);

        Ok(Self {
            tera,
        })
    }

    /// Render the artifact for `request`.
    pub fn render(&self, request: &GenerationRequest) -> Result<String> {
        let mut context = TeraContext::new();
        context.insert("name", &request.name);
        context.insert("display_name", &request.display_name);
        context.insert("description", &request.description);
        context.insert("author", request.author.as_deref().unwrap_or("TBD"));
        context.insert("team", request.team.as_deref().unwrap_or("TBD"));

        let template = request.kind.template_name();
        self.tera
            .render(template, &context)
            .with_context(|| format!("Failed to render {template} template"))
    }
}
