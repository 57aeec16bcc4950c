use formstate::form::FormModel;

#[derive(FormModel)]
struct DraftForm<T> {
    value: T,
}

fn main() {}
