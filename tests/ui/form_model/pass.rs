use formstate::form::{FormController, FormModel, FormOptions, value_map};
use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, formstate::form::FormModel)]
struct SignupForm {
    email: String,
    #[serde(rename = "acceptTerms", default)]
    accept_terms: bool,
}

#[derive(Clone, Default, Serialize, Deserialize, formstate::form::FormModel)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ProfileForm {
    display_name: String,
    #[serde(rename(serialize = "mail", deserialize = "mail"))]
    contact_email: String,
    #[serde(skip)]
    draft_note: String,
    r#type: u8,
}

#[derive(Default, Serialize, Deserialize, formstate::form::FormModel)]
#[serde(rename_all(serialize = "SCREAMING-KEBAB-CASE", deserialize = "SCREAMING-KEBAB-CASE"))]
struct LegacyForm {
    account_id: u32,
}

fn main() {
    let fields = SignupForm::fields();
    assert_eq!(fields.email().as_str(), "email");
    assert_eq!(fields.accept_terms().as_str(), "acceptTerms");
    assert_eq!(SignupForm::field_keys().len(), 2);

    let model = SignupForm {
        email: "a@b.c".to_string(),
        accept_terms: false,
    };
    let form = FormController::from_model(&model, FormOptions::default()).expect("form");
    form.change_values(value_map([(fields.accept_terms().as_str(), true)]))
        .expect("accept terms");
    let state = form.form_state().expect("state");
    assert!(state.is_dirty);
    let read_back = SignupForm::from_values(&state.values).expect("model");
    assert!(read_back.accept_terms);

    let profile = ProfileForm::fields();
    assert_eq!(profile.display_name().as_str(), "displayName");
    assert_eq!(profile.contact_email().as_str(), "mail");
    assert_eq!(profile.r#type().as_str(), "type");
    let keys = ProfileForm::field_keys()
        .iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>();
    assert_eq!(keys, ["displayName", "mail", "type"]);
    let draft = ProfileForm::default();
    assert!(draft.draft_note.is_empty());
    let values = draft.to_values().expect("values");
    assert_eq!(
        values.keys().map(String::as_str).collect::<Vec<_>>(),
        ["displayName", "mail", "type"]
    );

    assert_eq!(LegacyForm::fields().account_id().as_str(), "ACCOUNT-ID");
    assert!(
        LegacyForm::default()
            .to_values()
            .expect("values")
            .contains_key("ACCOUNT-ID")
    );
}
