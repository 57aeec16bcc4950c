use formstate::form::FormModel;

#[derive(FormModel)]
struct PairForm(String, String);

fn main() {}
