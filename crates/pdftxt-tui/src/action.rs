/// Everything the user can ask the UI to do, decoupled from key bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    GoTop,
    GoBottom,
    /// Enter: open a directory, toggle a file, or edit/cycle a setting.
    DrillIn,
    NavigateBack,
    /// Space: select a file or cycle a setting.
    ToggleSelect,
    /// Select every PDF in a folder.
    SelectFolder,
    /// Clear the selection, the queue, or a setting's value.
    Clear,
    AddFiles,
    OpenSettings,
    SaveConfig,
    StartProcessing,
    CancelProcessing,
    ToggleHelp,
    TextInput(char),
    TextBackspace,
    TextConfirm,
    TextCancel,
    Resize(u16, u16),
    Tick,
    None,
}
