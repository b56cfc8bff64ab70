use pyo3::pymodule;

pub mod eq_editor;
pub mod messages;

/// The Python module implemented in Rust.
#[pymodule]
mod sesame_eq {
    #[pymodule_export]
    use super::eq_editor::EqEditor;

    #[pymodule_export]
    use super::eq_editor::state::Band;

    #[pymodule_export]
    use super::eq_editor::state::FilterType;

    #[pymodule_export]
    use super::messages::PointerEvent;

    #[pymodule_export]
    use super::messages::PointerPhase;

    #[pymodule_export]
    use super::messages::EditorEvent;
}
