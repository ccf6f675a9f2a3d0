//! Tool dispatcher tests: the agent-visible surface
//!
//! Result strings are part of the contract, so several tests pin exact
//! message texts.

use serde_json::json;
use vending_simulator_core_rs::{EnvConfig, ToolRuntime};

fn runtime(seed: u64) -> ToolRuntime {
    let mut runtime = ToolRuntime::new(EnvConfig::default(), seed).unwrap();
    runtime.setup_default_suppliers();
    runtime
}

#[test]
fn test_unknown_tool_is_a_noop() {
    let mut runtime = runtime(1);
    let before_minutes = runtime.state().clock.total_minutes_elapsed();
    let outcome = runtime.execute("fly_to_the_moon", &json!({}));
    assert_eq!(outcome.message, "Unknown tool: fly_to_the_moon");
    assert!(!outcome.terminated);
    assert_eq!(runtime.state().clock.total_minutes_elapsed(), before_minutes);
    assert_eq!(runtime.simulator().message_count(), 0);
}

#[test]
fn test_sub_agent_tools_not_callable_directly() {
    let mut runtime = runtime(1);
    let outcome = runtime.execute("collect_cash", &json!({}));
    assert_eq!(outcome.message, "Unknown tool: collect_cash");
}

#[test]
fn test_get_money_balance_format() {
    let mut runtime = runtime(1);
    let outcome = runtime.execute("get_money_balance", &json!({}));
    assert_eq!(
        outcome.message,
        "Cash at hand: $500.00. Cash in machine (not collected): $0.00."
    );
    assert_eq!(runtime.state().clock.minute_of_day(), 5);
    assert_eq!(runtime.simulator().message_count(), 1);
}

#[test]
fn test_storage_inventory_empty_and_sorted() {
    let mut runtime = runtime(1);
    let outcome = runtime.execute("get_storage_inventory", &json!({}));
    assert_eq!(outcome.message, "Storage is empty.");

    runtime.simulator_mut().state_mut().add_to_storage("water", 3);
    runtime.simulator_mut().state_mut().add_to_storage("cola", 7);
    let outcome = runtime.execute("get_storage_inventory", &json!({}));
    assert_eq!(
        outcome.message,
        "Storage inventory:\n  cola: 7\n  water: 3"
    );
}

#[test]
fn test_read_inbox_marks_read_and_truncates() {
    let mut runtime = runtime(1);
    let outcome = runtime.execute("read_inbox", &json!({}));
    assert_eq!(outcome.message, "Inbox is empty.");

    // A failed order still files a supplier reply
    runtime.execute(
        "send_email",
        &json!({"to_addr": "supplier_1", "subject": "Order", "body": "cola 1"}),
    );
    assert_eq!(runtime.state().unread_emails_count(), 1);

    let outcome = runtime.execute("read_inbox", &json!({}));
    assert!(outcome.message.starts_with("[unread] From: supplier_1"));
    assert!(outcome.message.contains("Minimum order value"));
    assert_eq!(runtime.state().unread_emails_count(), 0);

    // Re-reading shows the read flag
    let outcome = runtime.execute("read_inbox", &json!({}));
    assert!(outcome.message.starts_with("[read] From: supplier_1"));
}

#[test]
fn test_read_inbox_shows_last_twenty() {
    let mut runtime = runtime(1);
    for i in 0..25 {
        runtime.execute(
            "send_email",
            &json!({"to_addr": "supplier_1", "subject": format!("Order {}", i), "body": "cola 1"}),
        );
    }
    let outcome = runtime.execute("read_inbox", &json!({}));
    let blocks = outcome.message.split("\n---\n").count();
    assert_eq!(blocks, 20);
    // Five oldest replies stay unread
    assert_eq!(runtime.state().unread_emails_count(), 5);
}

#[test]
fn test_send_email_success_path() {
    let mut runtime = runtime(7);
    let outcome = runtime.execute(
        "send_email",
        &json!({"to_addr": "supplier_1", "subject": "Order", "body": "cola 50"}),
    );
    assert!(outcome.message.starts_with("Email sent. Order confirmed: order_1. ETA day "));
    assert_eq!(runtime.state().cash_balance_cents, 45_000);
    assert_eq!(runtime.state().open_orders.len(), 1);
    // Outbox has the agent's email, inbox the confirmation
    assert_eq!(runtime.state().outbox.len(), 1);
    assert_eq!(runtime.state().outbox[0].from_addr, "agent");
    assert_eq!(runtime.state().inbox.len(), 1);
    assert!(runtime.state().inbox[0]
        .subject
        .starts_with("Order confirmed #order_1"));
}

#[test]
fn test_send_email_failure_still_files_reply() {
    let mut runtime = runtime(7);
    let outcome = runtime.execute(
        "send_email",
        &json!({"to_addr": "supplier_7", "subject": "Order", "body": "cola 50"}),
    );
    assert_eq!(
        outcome.message,
        "Email sent. Supplier replied: We don't recognize this address. Please check the supplier ID."
    );
    assert_eq!(runtime.state().outbox.len(), 1);
    assert_eq!(runtime.state().inbox.len(), 1);
    assert_eq!(runtime.state().cash_balance_cents, 50_000);
}

#[test]
fn test_send_email_requires_recipient() {
    let mut runtime = runtime(1);
    let outcome = runtime.execute(
        "send_email",
        &json!({"subject": "Order", "body": "cola 50"}),
    );
    assert_eq!(outcome.message, "Error: to_addr required.");
    // The clock still advanced by the tool's time cost
    assert_eq!(runtime.state().clock.minute_of_day(), 25);
}

#[test]
fn test_search_products_lists_catalog() {
    let mut runtime = runtime(1);
    let outcome = runtime.execute("search_products", &json!({"query": "drinks"}));
    assert!(outcome
        .message
        .starts_with("Products (register suppliers to see prices):"));
    assert!(outcome.message.contains("  cola: $1.00 (small)"));
    assert!(outcome.message.contains("  sandwich: $2.60 (large)"));

    let mut bare = ToolRuntime::new(EnvConfig::default(), 1).unwrap();
    let outcome = bare.execute("search_products", &json!({}));
    assert_eq!(
        outcome.message,
        "No product catalog loaded. Register suppliers first."
    );
}

#[test]
fn test_sub_agent_specs_fixed_string() {
    let mut runtime = runtime(1);
    let outcome = runtime.execute("sub_agent_specs", &json!({}));
    assert!(outcome.message.starts_with("Sub-agent can: machine_inventory"));
    assert!(outcome.message.contains("collect_cash"));
}

#[test]
fn test_run_sub_agent_and_chat() {
    let mut runtime = runtime(1);
    runtime.simulator_mut().state_mut().add_to_storage("cola", 20);
    let outcome = runtime.execute(
        "run_sub_agent",
        &json!({"instruction": "restock cola 10 in slot 0"}),
    );
    assert_eq!(outcome.message, "Stocked 10 x cola into slot 0.");
    // 75 minutes for run_sub_agent
    assert_eq!(runtime.state().clock.minute_of_day(), 75);

    let outcome = runtime.execute("chat_with_sub_agent", &json!({"question": "what did you do?"}));
    assert!(outcome.message.starts_with("Last actions:"));
    assert_eq!(runtime.state().clock.minute_of_day(), 100);

    let outcome = runtime.execute("run_sub_agent", &json!({"instruction": "gibberish"}));
    assert!(outcome.message.starts_with("I didn't understand."));
}

#[test]
fn test_wait_for_next_day_report_format() {
    let mut runtime = runtime(1);
    let outcome = runtime.execute("wait_for_next_day", &json!({}));
    let lines: Vec<&str> = outcome.message.lines().collect();
    assert_eq!(lines[0], "--- Morning report, Day 1 ---");
    assert_eq!(lines[1], "Sales yesterday: none");
    assert_eq!(lines[2], "Cash collected yesterday: $0.00");
    assert_eq!(lines[3], "Deliveries: none");
    assert_eq!(lines[4], "New emails: 0");
    assert!(!outcome.terminated);
}

#[test]
fn test_empty_run_five_days_through_dispatcher() {
    // Scenario: config defaults, five wait_for_next_day calls only
    let mut runtime = runtime(42);
    for _ in 0..5 {
        let outcome = runtime.execute("wait_for_next_day", &json!({}));
        assert!(!outcome.terminated);
    }
    assert_eq!(runtime.state().cash_balance_cents, 49_000);
    assert_eq!(runtime.state().net_worth_cents(), 49_000);
    assert_eq!(runtime.state().total_units_sold, 0);
}

#[test]
fn test_restock_then_sell_accrues_machine_cash() {
    let mut runtime = runtime(4242);
    runtime.simulator_mut().state_mut().add_to_storage("cola", 50);
    runtime.execute(
        "run_sub_agent",
        &json!({"instruction": "restock cola 10 in slot 0"}),
    );
    assert_eq!(runtime.state().storage_inventory.get("cola"), Some(&40));
    assert_eq!(runtime.state().prices_cents.get("cola"), Some(&150));

    let before_qty = runtime.state().slot_by_id(0).unwrap().quantity;
    assert_eq!(before_qty, 10);
    runtime.execute("wait_for_next_day", &json!({}));

    let after_qty = runtime.state().slot_by_id(0).unwrap().quantity;
    let sold = before_qty - after_qty;
    assert!(sold <= 10);
    assert_eq!(
        runtime.state().cash_in_machine_cents,
        sold as i64 * 150
    );
    assert_eq!(
        runtime.state().total_units_sold,
        sold as u64
    );
}

#[test]
fn test_termination_is_sticky() {
    let config = EnvConfig {
        max_days: 1,
        ..EnvConfig::default()
    };
    let mut runtime = ToolRuntime::new(config, 1).unwrap();
    runtime.setup_default_suppliers();

    let outcome = runtime.execute("wait_for_next_day", &json!({}));
    assert!(outcome.terminated);
    assert!(runtime.is_terminated());

    let minutes = runtime.state().clock.total_minutes_elapsed();
    let messages = runtime.simulator().message_count();

    for tool in ["get_money_balance", "wait_for_next_day", "send_email"] {
        let outcome = runtime.execute(tool, &json!({}));
        assert_eq!(outcome.message, "Simulation already terminated.");
        assert!(outcome.terminated);
    }
    // No state mutation after termination
    assert_eq!(runtime.state().clock.total_minutes_elapsed(), minutes);
    assert_eq!(runtime.simulator().message_count(), messages);
}

#[test]
fn test_bankruptcy_through_dispatcher() {
    // $15 start, $2/day fee, threshold 10: bankruptcy on the 17th day-end
    let config = EnvConfig {
        initial_cash_cents: 1_500,
        ..EnvConfig::default()
    };
    let mut runtime = ToolRuntime::new(config, 9).unwrap();
    runtime.setup_default_suppliers();

    let mut day_ends = 0;
    for _ in 0..20 {
        let outcome = runtime.execute("wait_for_next_day", &json!({}));
        day_ends += 1;
        if outcome.terminated {
            break;
        }
    }
    assert_eq!(day_ends, 17);
    assert_eq!(
        runtime.termination_reason(),
        Some(vending_simulator_core_rs::TerminationReason::Bankruptcy)
    );
    assert_eq!(runtime.state().cash_balance_cents, 100);
    assert_eq!(runtime.state().consecutive_days_unpaid_fee, 10);
}

#[test]
fn test_clock_monotone_across_all_tools() {
    let mut runtime = runtime(8);
    let mut last = runtime.state().clock.total_minutes_elapsed();
    let calls = [
        ("get_money_balance", json!({})),
        ("search_products", json!({})),
        ("wait_for_next_day", json!({})),
        ("read_inbox", json!({})),
        ("chat_with_sub_agent", json!({"question": "inventory"})),
        ("wait_for_next_day", json!({})),
    ];
    for (tool, args) in calls {
        runtime.execute(tool, &args);
        let now = runtime.state().clock.total_minutes_elapsed();
        assert!(now > last, "{} did not advance time", tool);
        last = now;
    }
}
