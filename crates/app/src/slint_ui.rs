slint::slint! {
    import { GroupBox, Button, LineEdit, CheckBox, HorizontalBox, VerticalBox } from "std-widgets.slint";

    export component OptionsDialog inherits Window {
        title: "MouseFlip Options";
        width: 380px;
        min-height: 260px;
        always-on-top: true;
        default-font-family: root.text_font;

        callback confirm(bool, bool, string);
        callback cancel();

        in-out property <string> text_font: "";
        in-out property <bool> startup_enabled: false;
        in-out property <bool> auto_switch_enabled: true;
        in-out property <string> detected_devices: "0";
        in-out property <string> base_device_count: "1";

        VerticalBox {
            padding: 12px;
            spacing: 8px;

            CheckBox {
                text: "Start MouseFlip when Windows starts";
                checked: root.startup_enabled;
                toggled => { root.startup_enabled = self.checked; }
            }

            GroupBox {
                title: "Auto-switch";

                GridLayout {
                    spacing: 8px;
                    padding: 4px;

                    Row {
                        CheckBox {
                            text: "Switch to left-handed when an external mouse is connected";
                            checked: root.auto_switch_enabled;
                            toggled => { root.auto_switch_enabled = self.checked; }
                            colspan: 2;
                        }
                    }

                    Row {
                        Text { text: "Detected devices:"; vertical-alignment: center; }
                        Text { text: root.detected_devices; vertical-alignment: center; }
                    }

                    Row {
                        Text { text: "Base devices:"; vertical-alignment: center; }
                        LineEdit {
                            text: root.base_device_count;
                            width: 60px;
                            edited(txt) => { root.base_device_count = txt; }
                        }
                    }
                }
            }

            HorizontalBox {
                alignment: end;
                spacing: 8px;
                Button { text: "Cancel"; clicked => { root.cancel(); } }
                Button { text: "OK"; primary: true; clicked => { root.confirm(root.startup_enabled, root.auto_switch_enabled, root.base_device_count); } }
            }
        }
    }

    export component AboutDialog inherits Window {
        title: "About MouseFlip";
        width: 340px;
        min-height: 180px;
        always-on-top: true;
        default-font-family: root.text_font;

        callback close();

        in-out property <string> text_font: "";
        in-out property <string> message: "";

        VerticalBox {
            padding: 16px;
            spacing: 12px;

            Text {
                text: root.message;
                font-size: 13px;
                wrap: word-wrap;
            }

            HorizontalBox {
                alignment: end;
                Button { text: "OK"; primary: true; clicked => { root.close(); } }
            }
        }
    }
}
