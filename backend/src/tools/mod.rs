//! Tool dispatcher
//!
//! The public surface an external decision maker drives. Each main-agent
//! tool advances the clock by its time cost, applies its effect and
//! returns a human-readable result string; result texts are part of the
//! contract (agents read them), so they are kept stable and short.
//!
//! Termination is sticky: once an episode ends, every further call
//! short-circuits without touching state.

use serde_json::Value;

use crate::config::{ConfigError, EnvConfig};
use crate::core::money::format_cents;
use crate::models::email::Email;
use crate::models::state::VendingState;
use crate::orchestrator::{Simulator, TerminationReason};
use crate::subagent::SubAgentExecutor;
use crate::suppliers::defaults::default_suppliers;

/// Inbox emails shown per read_inbox call.
const INBOX_DISPLAY_LIMIT: usize = 20;

/// Body truncation in inbox display.
const INBOX_BODY_CHARS: usize = 300;

/// Reply truncation in send_email results.
const REPLY_RESULT_CHARS: usize = 400;

/// Catalog entries shown per search_products call.
const CATALOG_DISPLAY_LIMIT: usize = 30;

/// Tool names callable by the main agent.
pub const MAIN_AGENT_TOOL_NAMES: [&str; 9] = [
    "get_money_balance",
    "get_storage_inventory",
    "read_inbox",
    "send_email",
    "search_products",
    "wait_for_next_day",
    "sub_agent_specs",
    "run_sub_agent",
    "chat_with_sub_agent",
];

/// Tool names reachable only through the sub-agent executor.
pub const SUB_AGENT_TOOL_NAMES: [&str; 4] = [
    "machine_inventory",
    "stock_from_storage",
    "set_price",
    "collect_cash",
];

/// Sealed main-agent tool surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainTool {
    GetMoneyBalance,
    GetStorageInventory,
    ReadInbox,
    SendEmail,
    SearchProducts,
    WaitForNextDay,
    SubAgentSpecs,
    RunSubAgent,
    ChatWithSubAgent,
}

impl MainTool {
    /// Resolve a tool name; None for anything outside the surface.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "get_money_balance" => Some(MainTool::GetMoneyBalance),
            "get_storage_inventory" => Some(MainTool::GetStorageInventory),
            "read_inbox" => Some(MainTool::ReadInbox),
            "send_email" => Some(MainTool::SendEmail),
            "search_products" => Some(MainTool::SearchProducts),
            "wait_for_next_day" => Some(MainTool::WaitForNextDay),
            "sub_agent_specs" => Some(MainTool::SubAgentSpecs),
            "run_sub_agent" => Some(MainTool::RunSubAgent),
            "chat_with_sub_agent" => Some(MainTool::ChatWithSubAgent),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MainTool::GetMoneyBalance => "get_money_balance",
            MainTool::GetStorageInventory => "get_storage_inventory",
            MainTool::ReadInbox => "read_inbox",
            MainTool::SendEmail => "send_email",
            MainTool::SearchProducts => "search_products",
            MainTool::WaitForNextDay => "wait_for_next_day",
            MainTool::SubAgentSpecs => "sub_agent_specs",
            MainTool::RunSubAgent => "run_sub_agent",
            MainTool::ChatWithSubAgent => "chat_with_sub_agent",
        }
    }
}

/// Result of one dispatched tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub message: String,
    pub terminated: bool,
}

impl ToolOutcome {
    fn live(message: String) -> Self {
        Self {
            message,
            terminated: false,
        }
    }
}

/// Executes main-agent tool calls against the simulator.
///
/// # Example
///
/// ```rust
/// use vending_simulator_core_rs::{EnvConfig, ToolRuntime};
/// use serde_json::json;
///
/// let mut runtime = ToolRuntime::new(EnvConfig::default(), 42).unwrap();
/// runtime.setup_default_suppliers();
///
/// let outcome = runtime.execute("get_money_balance", &json!({}));
/// assert!(outcome.message.starts_with("Cash at hand: $500.00"));
/// ```
#[derive(Debug)]
pub struct ToolRuntime {
    sim: Simulator,
    sub_agent: SubAgentExecutor,
    terminated: bool,
    termination_reason: Option<TerminationReason>,
}

impl ToolRuntime {
    pub fn new(config: EnvConfig, seed: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            sim: Simulator::new(config, seed)?,
            sub_agent: SubAgentExecutor::new(),
            terminated: false,
            termination_reason: None,
        })
    }

    /// Register the built-in default suppliers.
    pub fn setup_default_suppliers(&mut self) {
        for supplier in default_suppliers() {
            self.sim.register_supplier(supplier);
        }
    }

    pub fn state(&self) -> &VendingState {
        self.sim.state()
    }

    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    pub fn simulator_mut(&mut self) -> &mut Simulator {
        &mut self.sim
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.termination_reason
    }

    /// Execute one main-agent tool call.
    pub fn execute(&mut self, tool_name: &str, args: &Value) -> ToolOutcome {
        let Some(tool) = MainTool::from_name(tool_name) else {
            return ToolOutcome::live(format!("Unknown tool: {}", tool_name));
        };

        if self.terminated {
            return ToolOutcome {
                message: "Simulation already terminated.".to_string(),
                terminated: true,
            };
        }

        // Every tool except wait_for_next_day advances the clock first;
        // due deliveries land before the tool's own effect
        if tool != MainTool::WaitForNextDay {
            self.sim.apply_tool_step(tool.name());
        }

        match tool {
            MainTool::GetMoneyBalance => {
                let state = self.sim.state();
                ToolOutcome::live(format!(
                    "Cash at hand: {}. Cash in machine (not collected): {}.",
                    format_cents(state.cash_balance_cents),
                    format_cents(state.cash_in_machine_cents)
                ))
            }

            MainTool::GetStorageInventory => {
                let state = self.sim.state();
                if state.storage_inventory.is_empty() {
                    return ToolOutcome::live("Storage is empty.".to_string());
                }
                let mut lines = vec!["Storage inventory:".to_string()];
                for (item_id, qty) in &state.storage_inventory {
                    lines.push(format!("  {}: {}", item_id, qty));
                }
                ToolOutcome::live(lines.join("\n"))
            }

            MainTool::ReadInbox => ToolOutcome::live(self.read_inbox()),

            MainTool::SendEmail => ToolOutcome::live(self.send_email(args)),

            MainTool::SearchProducts => {
                let catalog = self.sim.suppliers().product_catalog();
                if catalog.is_empty() {
                    return ToolOutcome::live(
                        "No product catalog loaded. Register suppliers first.".to_string(),
                    );
                }
                let mut lines = vec!["Products (register suppliers to see prices):".to_string()];
                for (item_id, info) in catalog.iter().take(CATALOG_DISPLAY_LIMIT) {
                    lines.push(format!(
                        "  {}: {} ({})",
                        item_id,
                        format_cents(info.wholesale_price_cents),
                        info.size_class
                    ));
                }
                ToolOutcome::live(lines.join("\n"))
            }

            MainTool::WaitForNextDay => {
                let outcome = self.sim.end_day_and_report();
                self.terminated = outcome.terminated;
                self.termination_reason = outcome.reason;
                let report = &outcome.report;
                let sales = if report.sales.is_empty() {
                    "none".to_string()
                } else {
                    report
                        .sales
                        .iter()
                        .map(|(item, qty)| format!("{}: {}", item, qty))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                let deliveries = if report.deliveries.is_empty() {
                    "none".to_string()
                } else {
                    report.deliveries.join(", ")
                };
                let message = [
                    format!("--- Morning report, Day {} ---", report.day),
                    format!("Sales yesterday: {}", sales),
                    format!(
                        "Cash collected yesterday: {}",
                        format_cents(report.cash_collected_cents)
                    ),
                    format!("Deliveries: {}", deliveries),
                    format!("New emails: {}", report.new_emails.len()),
                ]
                .join("\n");
                ToolOutcome {
                    message,
                    terminated: outcome.terminated,
                }
            }

            MainTool::SubAgentSpecs => ToolOutcome::live(
                "Sub-agent can: machine_inventory, stock_from_storage(item_id, quantity, \
                 slot_id), set_price(item_id, price), collect_cash. Use \
                 run_sub_agent(instruction) or chat_with_sub_agent(question)."
                    .to_string(),
            ),

            MainTool::RunSubAgent => {
                let instruction = arg_str(args, "instruction");
                let result = self
                    .sub_agent
                    .run_instruction(self.sim.state_mut(), &instruction);
                ToolOutcome::live(result.message)
            }

            MainTool::ChatWithSubAgent => {
                let question = arg_str(args, "question");
                ToolOutcome::live(self.sub_agent.chat(self.sim.state(), &question))
            }
        }
    }

    /// Format the last 20 inbox emails and mark them as read.
    fn read_inbox(&mut self) -> String {
        let state = self.sim.state_mut();
        if state.inbox.is_empty() {
            return "Inbox is empty.".to_string();
        }
        let start = state.inbox.len().saturating_sub(INBOX_DISPLAY_LIMIT);
        let mut blocks = Vec::new();
        for email in &mut state.inbox[start..] {
            let status = if email.is_read { "read" } else { "unread" };
            let body: String = email.body.chars().take(INBOX_BODY_CHARS).collect();
            blocks.push(format!(
                "[{}] From: {} | Subject: {}\n{}",
                status, email.from_addr, email.subject, body
            ));
            email.is_read = true;
        }
        blocks.join("\n---\n")
    }

    /// Record the outgoing email, try it as an order, and always file the
    /// supplier's reply in the inbox.
    fn send_email(&mut self, args: &Value) -> String {
        let to_addr = arg_str(args, "to_addr").trim().to_string();
        let subject = arg_str(args, "subject");
        let body = arg_str(args, "body");
        if to_addr.is_empty() {
            return "Error: to_addr required.".to_string();
        }

        let state = self.sim.state_mut();
        let day = state.clock.current_day();
        let email_id = state.next_email_id();
        state
            .outbox
            .push(Email::new(email_id, "agent", &to_addr, &subject, &body, day));

        let result = self.sim.process_order_email(&to_addr, &subject, &body);

        let state = self.sim.state_mut();
        let day = state.clock.current_day();
        let email_id = state.next_email_id();
        state.inbox.push(Email::new(
            email_id,
            &to_addr,
            "agent",
            &result.reply_subject,
            &result.reply_body,
            day,
        ));

        if result.success {
            let order = result.order.as_ref().expect("successful order present");
            format!(
                "Email sent. Order confirmed: {}. ETA day {}.",
                order.order_id, order.eta_day
            )
        } else {
            let reply: String = result.reply_body.chars().take(REPLY_RESULT_CHARS).collect();
            format!("Email sent. Supplier replied: {}", reply)
        }
    }
}

fn arg_str(args: &Value, key: &str) -> String {
    args.get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}
