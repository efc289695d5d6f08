//! Employee flow against the in-memory store: submit a bill, then list bills

use anyhow::Result;
use billed::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "billed=debug".into()))
        .init();

    println!("🧾 Billed employee flow\n");

    let storage = InMemorySessionStorage::new();
    SessionContext::new("employee@test.tld").save(&storage)?;
    let session = SessionContext::load(&storage)?;

    let store = InMemoryStore::new();
    let navigator: Arc<dyn Navigator> = Arc::new(|path: &str| println!("➡️  navigate to {}", path));

    let form = NewBillForm::new(store.clone(), session, navigator.clone());
    let receipt = form
        .handle_file_selected(&[SelectedFile::new(
            "ticket.png",
            "image/png",
            b"\x89PNG".to_vec(),
        )])
        .await?;
    println!("✅ Uploaded attachment: {}", receipt.file_url);

    let fields = FormFields {
        bill_type: "Transports".to_string(),
        name: "Vol Paris Londres".to_string(),
        amount: "348".to_string(),
        date: "2022-04-04".to_string(),
        vat: "70".to_string(),
        pct: "20".to_string(),
        commentary: "Séminaire".to_string(),
    };
    let bill = form.handle_submit(&fields).await?;
    println!("✅ Submitted bill {} ({})", bill.id, format_status(bill.status));

    let list = BillsList::new(
        store,
        navigator,
        Arc::new(|element: &PreviewElement| {
            println!("👁️  preview {}", element.bill_url().unwrap_or("-"));
        }),
    );

    let bills = list.fetch_all().await?;
    println!("\n📋 {} bill(s):", bills.len());
    for bill in &bills {
        println!("  - {} | {} | {} €", bill.date, bill.name, bill.amount);
    }

    let icons = bills
        .iter()
        .filter_map(|b| b.file_url.clone())
        .map(PreviewElement::new)
        .collect();
    list.bind_preview_triggers(icons).fire_all();

    Ok(())
}
