use formstate::form::FormModel;

#[derive(FormModel)]
enum Choice {
    Yes,
    No,
}

fn main() {}
