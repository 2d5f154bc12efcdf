//! The shared fee payment form used by the collect and edit pages, and the
//! parsing of its submission into a validated invoice draft.

use maud::{Markup, PreEscaped, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        HeadElement,
    },
    invoice::{
        core::{FeeItem, InvoiceDraft, InvoiceId},
        items::{clean_items, validate_items, zip_form_rows},
        numbering::next_invoice_number,
        totals::compute_totals,
    },
    urdu::transliterate,
};

/// The fee payment form always renders at least this many item rows.
const MIN_ITEM_ROWS: usize = 6;

/// The fee payment form exactly as posted.
///
/// The item columns arrive as parallel repeated fields, one entry per
/// rendered row, most of them blank.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceForm {
    /// The payment date.
    pub date: Date,
    /// The student's name as typed.
    pub student_name: String,
    /// The father's name as typed.
    pub father_name: String,
    /// The class as typed.
    pub class_name: String,
    /// The invoice number; blank means "use the suggested next number".
    pub invoice_no: String,
    /// The item labels, one per form row.
    #[serde(default)]
    pub item_label: Vec<String>,
    /// The item amounts, one per form row.
    #[serde(default)]
    pub item_amount: Vec<String>,
    /// The amount received, still raw text.
    pub amount_received: String,
}

/// Validate a submitted form into a draft ready to commit.
///
/// Names are transliterated and trimmed, items cleaned and gated, totals
/// derived. A blank invoice number falls back to the next number computed
/// from `existing_numbers`.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingField] if a required text field is empty,
/// - [Error::IncompleteItems] if no item has both a label and an amount,
/// - or [Error::ReceivedExceedsTotal] if the received amount is too large.
pub fn build_invoice_draft(
    form: InvoiceForm,
    existing_numbers: &[String],
) -> Result<InvoiceDraft, Error> {
    let student_name = transliterate(form.student_name.trim());
    if student_name.is_empty() {
        return Err(Error::MissingField("student name"));
    }

    let father_name = transliterate(form.father_name.trim());
    if father_name.is_empty() {
        return Err(Error::MissingField("father name"));
    }

    let class_name = form.class_name.trim().to_owned();
    if class_name.is_empty() {
        return Err(Error::MissingField("class"));
    }

    let items = clean_items(&zip_form_rows(form.item_label, form.item_amount));
    validate_items(&items)?;

    let totals = compute_totals(&items, &form.amount_received)?;

    let invoice_no = match form.invoice_no.trim() {
        "" => next_invoice_number(existing_numbers.iter().map(String::as_str)),
        number => number.to_owned(),
    };

    Ok(InvoiceDraft {
        invoice_no,
        date: form.date,
        student_name,
        father_name,
        class_name,
        items,
        totals,
    })
}

/// Whether the form commits a new invoice or replaces an existing one.
pub enum FormAction {
    /// POST to the create endpoint.
    Create,
    /// PUT to the given invoice.
    Edit(InvoiceId),
}

/// Default values shown in the form fields.
pub struct InvoiceFormDefaults<'a> {
    /// The payment date.
    pub date: Date,
    /// The student's name.
    pub student_name: &'a str,
    /// The father's name.
    pub father_name: &'a str,
    /// The class.
    pub class_name: &'a str,
    /// The invoice number.
    pub invoice_no: &'a str,
    /// The committed items, if editing.
    pub items: &'a [FeeItem],
    /// The amount received.
    pub amount_received: i64,
}

/// Inline script that live-updates the total and remaining fields as item
/// amounts are typed, mirroring what the committed totals will be.
pub fn totals_script() -> HeadElement {
    HeadElement::ScriptSource(PreEscaped(
        r#"
        function recomputeTotals() {
            let total = 0;
            for (const input of document.querySelectorAll("input[name='item_amount']")) {
                const value = Math.max(Math.round(Number(input.value)), 0);
                if (Number.isFinite(value)) {
                    total += value;
                }
            }
            const received = Math.max(Math.round(Number(
                document.getElementById("amount_received").value)), 0) || 0;
            document.getElementById("total_amount").value = total;
            document.getElementById("remaining_amount").value = Math.max(total - received, 0);
        }
        document.addEventListener("input", (event) => {
            if (event.target.matches("input[name='item_amount'], #amount_received")) {
                recomputeTotals();
            }
        });
        document.addEventListener("DOMContentLoaded", recomputeTotals);
        "#
        .to_owned(),
    ))
}

/// The fee payment form.
pub fn invoice_form(action: FormAction, defaults: &InvoiceFormDefaults<'_>) -> Markup {
    let (post_url, put_url, submit_label) = match action {
        FormAction::Create => (Some(endpoints::INVOICES_API.to_owned()), None, "Save"),
        FormAction::Edit(invoice_id) => (
            None,
            Some(endpoints::format_endpoint(endpoints::INVOICE, invoice_id)),
            "Save Changes",
        ),
    };
    let row_count = (defaults.items.len() + 2).max(MIN_ITEM_ROWS);

    html! {
        form
            class="w-full max-w-3xl space-y-6"
            hx-post=[post_url.as_deref()]
            hx-put=[put_url.as_deref()]
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
        {
            div class="grid grid-cols-1 sm:grid-cols-2 gap-4"
            {
                div
                {
                    label for="student_name" class=(FORM_LABEL_STYLE) { "طالب علم کا نام" }

                    input
                        name="student_name"
                        id="student_name"
                        type="text"
                        dir="rtl"
                        lang="ur"
                        placeholder="طالب علم کا نام درج کریں"
                        value=(defaults.student_name)
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="father_name" class=(FORM_LABEL_STYLE) { "والد کا نام" }

                    input
                        name="father_name"
                        id="father_name"
                        type="text"
                        dir="rtl"
                        lang="ur"
                        placeholder="والد کا نام درج کریں"
                        value=(defaults.father_name)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="class_name" class=(FORM_LABEL_STYLE) { "کلاس" }

                    input
                        name="class_name"
                        id="class_name"
                        type="text"
                        placeholder="مثلاً: جماعت 7"
                        value=(defaults.class_name)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "تاریخ" }

                    input
                        name="date"
                        id="date"
                        type="date"
                        value=(defaults.date)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="invoice_no" class=(FORM_LABEL_STYLE) { "انوائس نمبر" }

                input
                    name="invoice_no"
                    id="invoice_no"
                    type="text"
                    value=(defaults.invoice_no)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            fieldset
            {
                legend class="text-lg font-semibold mb-2" { "فیس آئٹمز" }

                div class="space-y-2"
                {
                    @for row in 0..row_count {
                        @let item = defaults.items.get(row);

                        div class="grid grid-cols-[1fr_8rem] gap-2"
                        {
                            input
                                name="item_label"
                                type="text"
                                dir="rtl"
                                lang="ur"
                                placeholder="مثلاً: ماہانہ فیس"
                                value=(item.map(|item| item.label.as_str()).unwrap_or(""))
                                class=(FORM_TEXT_INPUT_STYLE);

                            input
                                name="item_amount"
                                type="number"
                                min="0"
                                step="1"
                                placeholder="0"
                                value=[item.map(|item| item.amount)]
                                class=(FORM_TEXT_INPUT_STYLE);
                        }
                    }
                }
            }

            div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
            {
                div
                {
                    label for="total_amount" class=(FORM_LABEL_STYLE) { "کل رقم" }

                    input
                        id="total_amount"
                        type="number"
                        value=(defaults.items.iter().map(|item| item.amount).sum::<i64>())
                        readonly
                        tabindex="-1"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="amount_received" class=(FORM_LABEL_STYLE) { "وصول شدہ رقم" }

                    input
                        name="amount_received"
                        id="amount_received"
                        type="number"
                        min="0"
                        step="1"
                        value=(defaults.amount_received)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="remaining_amount" class=(FORM_LABEL_STYLE) { "بقایا رقم" }

                    input
                        id="remaining_amount"
                        type="number"
                        value=(defaults.items.iter().map(|item| item.amount).sum::<i64>()
                            .saturating_sub(defaults.amount_received).max(0))
                        readonly
                        tabindex="-1"
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div class="flex gap-4"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }

                a href=(endpoints::HISTORY_VIEW) class=(format!("{BUTTON_SECONDARY_STYLE} text-center")) { "History" }
            }
        }
    }
}

#[cfg(test)]
mod build_invoice_draft_tests {
    use time::macros::date;

    use crate::{Error, invoice::core::FeeItem};

    use super::{InvoiceForm, build_invoice_draft};

    fn form() -> InvoiceForm {
        InvoiceForm {
            date: date!(2025 - 03 - 10),
            student_name: "حسن".to_owned(),
            father_name: "اکرم".to_owned(),
            class_name: "جماعت 7".to_owned(),
            invoice_no: "INV-0005".to_owned(),
            item_label: vec!["ماہانہ فیس".to_owned(), "".to_owned()],
            item_amount: vec!["500.7".to_owned(), "0".to_owned()],
            amount_received: "200".to_owned(),
        }
    }

    #[test]
    fn builds_clean_draft_with_derived_totals() {
        let draft = build_invoice_draft(form(), &[]).unwrap();

        assert_eq!(
            draft.items,
            vec![FeeItem {
                label: "ماہانہ فیس".to_owned(),
                amount: 501
            }]
        );
        assert_eq!(draft.totals.total, 501);
        assert_eq!(draft.totals.received, 200);
        assert_eq!(draft.totals.remaining, 301);
        assert_eq!(draft.invoice_no, "INV-0005");
    }

    #[test]
    fn blank_invoice_number_falls_back_to_next_number() {
        let mut blank = form();
        blank.invoice_no = "  ".to_owned();

        let draft = build_invoice_draft(blank, &["INV-0007".to_owned()]).unwrap();

        assert_eq!(draft.invoice_no, "INV-0008");
    }

    #[test]
    fn rejects_empty_student_name() {
        let mut missing = form();
        missing.student_name = "  ".to_owned();

        assert_eq!(
            build_invoice_draft(missing, &[]),
            Err(Error::MissingField("student name"))
        );
    }

    #[test]
    fn rejects_incomplete_items() {
        let mut incomplete = form();
        incomplete.item_label = vec!["".to_owned()];
        incomplete.item_amount = vec!["500".to_owned()];

        assert_eq!(
            build_invoice_draft(incomplete, &[]),
            Err(Error::IncompleteItems)
        );
    }

    #[test]
    fn rejects_received_greater_than_total() {
        let mut overpaid = form();
        overpaid.amount_received = "600".to_owned();

        assert_eq!(
            build_invoice_draft(overpaid, &[]),
            Err(Error::ReceivedExceedsTotal {
                received: 600,
                total: 501
            })
        );
    }

    #[test]
    fn transliterates_latin_names() {
        let mut latin = form();
        latin.student_name = "aamir".to_owned();

        let draft = build_invoice_draft(latin, &[]).unwrap();

        assert_eq!(draft.student_name, "امیر");
    }
}
