/// Console-window handling for streaming sessions.
///
/// When this tool is started by the streaming host on Windows it usually gets
/// its own console window, which would sit in the middle of the captured
/// desktop for the whole play session. Minimize it once at startup.
///
/// Pseudo-consoles (ConPTY hosts like Windows Terminal) report a console
/// handle without a real top-level window; those are left alone. On
/// non-Windows platforms this compiles to a no-op.

pub fn minimize_console_window() {
    #[cfg(windows)]
    imp::minimize();
}

#[cfg(windows)]
mod imp {
    use windows::Win32::Foundation::{LPARAM, WPARAM};
    use windows::Win32::System::Console::GetConsoleWindow;
    use windows::Win32::UI::WindowsAndMessaging::{
        IsWindow, PostMessageW, SC_MINIMIZE, WM_SYSCOMMAND,
    };

    /// `HWND` is not an owned handle; there is nothing to close on any of
    /// these paths.
    pub fn minimize() {
        let hwnd = unsafe { GetConsoleWindow() };
        if hwnd.is_invalid() {
            // No console attached at all.
            return;
        }
        if !unsafe { IsWindow(hwnd) }.as_bool() {
            // Pseudo-console: a handle, but no real window to minimize.
            return;
        }
        if let Err(e) =
            unsafe { PostMessageW(hwnd, WM_SYSCOMMAND, WPARAM(SC_MINIMIZE as usize), LPARAM(0)) }
        {
            eprintln!("[console] Failed to minimize console window: {e}");
        }
    }
}
