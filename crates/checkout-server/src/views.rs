//! HTML Views
//!
//! Minimal server-rendered pages for the checkout demo.

use checkout_core::{CheckoutForm, TransactionView};

/// Drop-in UI loaded by the checkout form
pub const DROPIN_SCRIPT_URL: &str = "https://js.braintreegateway.com/web/dropin/1.2.0/js/dropin.min.js";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// String literal safe to embed inside a `<script>` block
fn js_string(text: &str) -> String {
    serde_json::Value::String(text.to_string())
        .to_string()
        .replace("</", "<\\/")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
</head>
<body>
  <div class="wrapper">
{body}
  </div>
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn checkout_form(form: &CheckoutForm, error_details: Option<&str>) -> String {
    let notice = error_details
        .filter(|details| !details.is_empty())
        .map(|details| {
            let lines: String = details
                .lines()
                .map(|line| format!("      <p>{}</p>\n", escape(line)))
                .collect();
            format!("    <aside class=\"notice error\">\n{lines}    </aside>\n")
        })
        .unwrap_or_default();

    let body = format!(
        r#"    <header>
      <h1>Hi,<br>Let's test a transaction</h1>
      <p>Make a test payment with a card or PayPal</p>
    </header>
{notice}    <form id="payment-form" method="post" action="/checkouts">
      <section>
        <label for="amount">
          <span class="input-label">Amount</span>
          <input id="amount" name="amount" type="tel" min="1" placeholder="Amount" value="10">
        </label>
        <div id="bt-dropin"></div>
      </section>
      <input type="hidden" id="nonce" name="payment_method_nonce">
      <button class="button" type="submit"><span>Test Transaction</span></button>
    </form>
    <script src="{DROPIN_SCRIPT_URL}"></script>
    <script>
      var form = document.querySelector('#payment-form');
      var clientToken = {token};
      braintree.dropin.create({{ authorization: clientToken, container: '#bt-dropin' }}, function (createErr, instance) {{
        form.addEventListener('submit', function (event) {{
          event.preventDefault();
          instance.requestPaymentMethod(function (err, payload) {{
            if (err) {{ console.log('Error', err); return; }}
            document.querySelector('#nonce').value = payload.nonce;
            form.submit();
          }});
        }});
      }});
    </script>"#,
        token = js_string(&form.client_token),
    );

    layout("Checkout", &body)
}

fn row(out: &mut String, label: &str, value: Option<&str>) {
    out.push_str(&format!(
        "        <tr><td>{}</td><td>{}</td></tr>\n",
        escape(label),
        escape(value.unwrap_or("-"))
    ));
}

pub fn transaction_detail(view: &TransactionView) -> String {
    let txn = &view.transaction;

    let (heading, message) = if view.is_success {
        (
            "Sweet Success!".to_string(),
            "Your test transaction has been successfully processed.".to_string(),
        )
    } else {
        (
            "Transaction Failed".to_string(),
            format!(
                "Your test transaction has a status of {}.",
                txn.status
            ),
        )
    };

    let mut tables = String::new();
    tables.push_str("      <h2>Transaction</h2>\n      <table>\n");
    row(&mut tables, "id", Some(&txn.id));
    row(&mut tables, "type", Some("sale"));
    row(&mut tables, "amount", Some(&txn.amount.to_string()));
    row(&mut tables, "status", Some(txn.status.as_str()));
    row(
        &mut tables,
        "created_at",
        txn.created_at.map(|t| t.to_rfc3339()).as_deref(),
    );
    row(
        &mut tables,
        "processor_response",
        txn.processor_response_text.as_deref(),
    );
    tables.push_str("      </table>\n");

    if let Some(card) = &view.credit_card {
        tables.push_str("      <h2>Payment</h2>\n      <table>\n");
        row(&mut tables, "token", card.token.as_deref());
        row(&mut tables, "bin", card.bin.as_deref());
        row(&mut tables, "last_4", card.last_4.as_deref());
        row(&mut tables, "card_type", card.card_type.as_deref());
        row(&mut tables, "expiration_date", card.expiration_date().as_deref());
        row(&mut tables, "cardholder_name", card.cardholder_name.as_deref());
        row(&mut tables, "customer_location", card.customer_location.as_deref());
        tables.push_str("      </table>\n");
    }

    if let Some(customer) = &view.customer {
        tables.push_str("      <h2>Customer</h2>\n      <table>\n");
        row(&mut tables, "id", customer.id.as_deref());
        row(&mut tables, "first_name", customer.first_name.as_deref());
        row(&mut tables, "last_name", customer.last_name.as_deref());
        row(&mut tables, "email", customer.email.as_deref());
        row(&mut tables, "company", customer.company.as_deref());
        row(&mut tables, "website", customer.website.as_deref());
        row(&mut tables, "phone", customer.phone.as_deref());
        tables.push_str("      </table>\n");
    }

    let body = format!(
        r#"    <header>
      <h1>{heading}</h1>
      <p>{message}</p>
    </header>
    <section>
{tables}    </section>
    <a class="button" href="/checkouts">Test Another Transaction</a>"#,
        heading = escape(&heading),
        message = escape(&message),
    );

    layout("Transaction", &body)
}

/// Plain data page used by the token and marketplace sale utilities
pub fn utility(data: &str) -> String {
    layout("Utility", &format!("    <pre>{}</pre>", escape(data)))
}
