use formstate::form::FormModel;

#[derive(FormModel)]
struct ContactForm {
    #[serde(rename = 1)]
    email: String,
}

fn main() {}
