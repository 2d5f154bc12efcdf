//! The shared expenditure form and the parsing of its submission.

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error, endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    expenditure::core::{ExpenditureDraft, ExpenditureId},
    money::normalize_amount,
};

/// The expenditure form exactly as posted.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenditureForm {
    /// When the money was spent.
    pub date: Date,
    /// What the money was spent on, as typed.
    pub title: String,
    /// The amount, still raw text.
    pub amount: String,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
}

/// Validate a submitted form into a draft ready to commit.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingField] if the title is empty,
/// - or [Error::InvalidExpenditureAmount] if the amount does not normalize
///   to a positive whole number.
pub fn build_expenditure_draft(form: ExpenditureForm) -> Result<ExpenditureDraft, Error> {
    let title = form.title.trim().to_owned();
    if title.is_empty() {
        return Err(Error::MissingField("title"));
    }

    let amount = normalize_amount(&form.amount);
    if amount <= 0 {
        return Err(Error::InvalidExpenditureAmount);
    }

    Ok(ExpenditureDraft {
        date: form.date,
        title,
        amount,
        notes: form.notes.trim().to_owned(),
    })
}

/// Whether the form commits a new expenditure or replaces an existing one.
pub enum FormAction {
    /// POST to the create endpoint.
    Create,
    /// PUT to the given expenditure.
    Edit(ExpenditureId),
}

/// Default values shown in the form fields.
pub struct ExpenditureFormDefaults<'a> {
    /// When the money was spent.
    pub date: Date,
    /// What the money was spent on.
    pub title: &'a str,
    /// The amount spent.
    pub amount: Option<i64>,
    /// Free-form notes.
    pub notes: &'a str,
}

/// The expenditure form.
pub fn expenditure_form(action: FormAction, defaults: &ExpenditureFormDefaults<'_>) -> Markup {
    let (post_url, put_url, submit_label) = match action {
        FormAction::Create => (Some(endpoints::EXPENDITURES_API.to_owned()), None, "Save"),
        FormAction::Edit(expenditure_id) => (
            None,
            Some(endpoints::format_endpoint(
                endpoints::EXPENDITURE,
                expenditure_id,
            )),
            "Save Changes",
        ),
    };

    html! {
        form
            class="w-full grid grid-cols-1 sm:grid-cols-[10rem_1fr_8rem_1fr_auto] gap-2 items-end"
            hx-post=[post_url.as_deref()]
            hx-put=[put_url.as_deref()]
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
        {
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

            div
            {
                label for="title" class=(FORM_LABEL_STYLE) { "تفصیل" }

                input
                    name="title"
                    id="title"
                    type="text"
                    dir="rtl"
                    lang="ur"
                    placeholder="مثلاً: بجلی کا بل"
                    value=(defaults.title)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "رقم" }

                input
                    name="amount"
                    id="amount"
                    type="number"
                    min="1"
                    step="1"
                    placeholder="0"
                    value=[defaults.amount]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="notes" class=(FORM_LABEL_STYLE) { "نوٹس" }

                input
                    name="notes"
                    id="notes"
                    type="text"
                    dir="rtl"
                    lang="ur"
                    value=(defaults.notes)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
        }
    }
}

#[cfg(test)]
mod build_expenditure_draft_tests {
    use time::macros::date;

    use crate::Error;

    use super::{ExpenditureForm, build_expenditure_draft};

    fn form() -> ExpenditureForm {
        ExpenditureForm {
            date: date!(2025 - 03 - 05),
            title: " بجلی کا بل ".to_owned(),
            amount: "1500.4".to_owned(),
            notes: "".to_owned(),
        }
    }

    #[test]
    fn trims_and_normalizes() {
        let draft = build_expenditure_draft(form()).unwrap();

        assert_eq!(draft.title, "بجلی کا بل");
        assert_eq!(draft.amount, 1500);
    }

    #[test]
    fn rejects_empty_title() {
        let mut missing = form();
        missing.title = "  ".to_owned();

        assert_eq!(
            build_expenditure_draft(missing),
            Err(Error::MissingField("title"))
        );
    }

    #[test]
    fn rejects_non_positive_amounts() {
        for raw in ["0", "-100", "abc", ""] {
            let mut invalid = form();
            invalid.amount = raw.to_owned();

            assert_eq!(
                build_expenditure_draft(invalid),
                Err(Error::InvalidExpenditureAmount),
                "amount {raw:?} should be rejected"
            );
        }
    }
}
