//! ユーザー向けメッセージ（アラビア語 / 英語）
//!
//! ロケールは設定ファイルの `fleetcheck_language` キーに "ar" / "en" で保存される。

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ar,
    En,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Ar => "ar",
            Locale::En => "en",
        }
    }

    pub fn toggled(&self) -> Locale {
        match self {
            Locale::Ar => Locale::En,
            Locale::En => Locale::Ar,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    SelectDriver,
    SelectVehicle,
    UploadAllPhotos,
    AcceptDeclaration,
    NotesTooLong,
    VehicleNotAssigned,
    UnsupportedMedia,
    FileTooLarge,
    PhotoUploadFailed,
    PhotoUploaded,
    Submitting,
    SubmissionSucceeded,
    SaveFailed,
    SubmissionFailed,
    LoadDriversFailed,
    LoadVehiclesFailed,
    NoDrivers,
    NoVehiclesAssigned,
    SingleVehicleAssigned,
    VehiclesAssigned,
    NotesCounterSuffix,
    DeclarationPrompt,
    RetryPrompt,
    LanguageChanged,
    MissingSetting,
    PhotoFileNotFound,
    PhotoFolderNotFound,
    ConfigLoadFailed,
    PromptFailed,
    ConnectionFailed,
    FileAccessFailed,
}

impl Message {
    pub fn text(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ar => self.ar(),
            Locale::En => self.en(),
        }
    }

    fn ar(&self) -> &'static str {
        match self {
            Message::SelectDriver => "يرجى اختيار السائق",
            Message::SelectVehicle => "يرجى اختيار المركبة",
            Message::UploadAllPhotos => "يرجى رفع جميع الصور (4 جهات)",
            Message::AcceptDeclaration => "يرجى الموافقة على إقرار حالة المركبة",
            Message::NotesTooLong => "الملاحظات طويلة جداً. الحد الأقصى 500 حرف",
            Message::VehicleNotAssigned => "المركبة غير مخصصة لهذا السائق",
            Message::UnsupportedMedia => "يرجى اختيار صورة بصيغة JPG أو PNG أو WebP فقط",
            Message::FileTooLarge => "حجم الملف كبير جداً. الحد الأقصى 10 ميجابايت",
            Message::PhotoUploadFailed => "حدث خطأ أثناء رفع الصورة. يرجى المحاولة مرة أخرى",
            Message::PhotoUploaded => "تم رفع الصورة",
            Message::Submitting => "جاري الإرسال...",
            Message::SubmissionSucceeded => "تم حفظ بيانات الفحص بنجاح",
            Message::SaveFailed => "حدث خطأ أثناء حفظ البيانات",
            Message::SubmissionFailed => "حدث خطأ أثناء حفظ البيانات. يرجى المحاولة مرة أخرى",
            Message::LoadDriversFailed => "فشل تحميل قائمة السائقين",
            Message::LoadVehiclesFailed => "فشل تحميل المركبات المخصصة",
            Message::NoDrivers => "لا يوجد سائقين متاحين",
            Message::NoVehiclesAssigned => "لم يتم تعيين أي مركبة لك",
            Message::SingleVehicleAssigned => "مخصص لك مركبة واحدة فقط",
            Message::VehiclesAssigned => "مركبات مخصصة",
            Message::NotesCounterSuffix => "حرف",
            Message::DeclarationPrompt => "أقر بأن المعلومات والصور تعكس حالة المركبة الفعلية",
            Message::RetryPrompt => "إعادة المحاولة؟",
            Message::LanguageChanged => "تم تغيير اللغة",
            Message::MissingSetting => "إعداد مطلوب غير موجود. استخدم fleetcheck config",
            Message::PhotoFileNotFound => "ملف الصورة غير موجود",
            Message::PhotoFolderNotFound => "مجلد الصور غير موجود",
            Message::ConfigLoadFailed => "تعذر قراءة ملف الإعدادات",
            Message::PromptFailed => "تعذر قراءة الإدخال",
            Message::ConnectionFailed => "تعذر الاتصال بالخادم. يرجى المحاولة مرة أخرى",
            Message::FileAccessFailed => "تعذر قراءة الملف أو كتابته",
        }
    }

    fn en(&self) -> &'static str {
        match self {
            Message::SelectDriver => "Please select the driver",
            Message::SelectVehicle => "Please select the vehicle",
            Message::UploadAllPhotos => "Please upload photos from all 4 sides of the vehicle",
            Message::AcceptDeclaration => "Please accept the vehicle condition declaration",
            Message::NotesTooLong => "Notes are too long. Maximum 500 characters",
            Message::VehicleNotAssigned => "This vehicle is not assigned to the selected driver",
            Message::UnsupportedMedia => "Please select a JPG, PNG or WebP image only",
            Message::FileTooLarge => "File size too large. Maximum 10MB",
            Message::PhotoUploadFailed => "Error uploading photo. Please try again",
            Message::PhotoUploaded => "Photo uploaded",
            Message::Submitting => "Submitting...",
            Message::SubmissionSucceeded => "Inspection data has been saved successfully",
            Message::SaveFailed => "An error occurred while saving data",
            Message::SubmissionFailed => "An error occurred while saving data. Please try again",
            Message::LoadDriversFailed => "Failed to load drivers",
            Message::LoadVehiclesFailed => "Failed to load assigned vehicles",
            Message::NoDrivers => "No drivers available",
            Message::NoVehiclesAssigned => "No vehicle has been assigned to you",
            Message::SingleVehicleAssigned => "You have exactly one assigned vehicle",
            Message::VehiclesAssigned => "assigned vehicles",
            Message::NotesCounterSuffix => "characters",
            Message::DeclarationPrompt => {
                "I declare that the information and photos reflect the actual vehicle condition"
            }
            Message::RetryPrompt => "Retry?",
            Message::LanguageChanged => "Language changed",
            Message::MissingSetting => "A required setting is missing. Use fleetcheck config",
            Message::PhotoFileNotFound => "Photo file not found",
            Message::PhotoFolderNotFound => "Photo folder not found",
            Message::ConfigLoadFailed => "Could not read the settings file",
            Message::PromptFailed => "Could not read input",
            Message::ConnectionFailed => "Could not reach the server. Please try again",
            Message::FileAccessFailed => "Could not read or write the file",
        }
    }
}

/// 備考の文字数カウンタ表示: "12 / 500 characters"
pub fn notes_counter(count: usize, max: usize, locale: Locale) -> String {
    format!("{} / {} {}", count, max, Message::NotesCounterSuffix.text(locale))
}
