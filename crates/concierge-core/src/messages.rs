//! Fixed user-facing texts, one per locale.
//!
//! Nothing here is ever built from an error string; the catalog is closed so
//! that every reply the user sees is known in advance.

use crate::types::Locale;

/// Identifier of a localized text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Message {
    Welcome,
    CourseDataError,
    RateLimited,
    AuthFailed,
    TimedOut,
    UnknownError,
    NoCourseInfo,
    KnowledgeUnavailable,
    VoiceProcessing,
    AudioFailed,
    AudioNotUnderstood,

    // Example phrases substituted into the system prompt template.
    OffTopicExample,
    EnrollmentExample,
    NoInfoExample,
    TrialLessonExample,
    PostConsultationExample,
    CooperationExample,

    // Placeholders for blank course fields.
    UnspecifiedDescription,
    UnspecifiedPrice,
    UnspecifiedDuration,
    UnspecifiedSchedule,
    UnspecifiedAge,
}

impl Message {
    pub fn text(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Russian => self.russian(),
            Locale::Kyrgyz => self.kyrgyz(),
        }
    }

    fn russian(&self) -> &'static str {
        match self {
            Message::Welcome => "Привет! Я виртуальный менеджер IT Run Academy. Я здесь, чтобы помочь вам узнать о наших курсах и возможностях. Чем могу помочь?",
            Message::CourseDataError => "Внимание: Не удалось загрузить данные о курсах. Я буду отвечать на основе общих знаний, но точная информация о курсах может быть недоступна.",
            Message::RateLimited => "Извините, слишком много запросов. Подождите немного.",
            Message::AuthFailed => "Извините, произошла ошибка аутентификации. Сообщите администратору.",
            Message::TimedOut => "Извините, запрос к серверу занял слишком много времени. Попробуйте еще раз.",
            Message::UnknownError => "Извините, произошла внутренняя ошибка. Попробуйте еще раз или свяжитесь с поддержкой.",
            Message::NoCourseInfo => "Информация о курсах пока недоступна в полном объеме. Сообщите администратору, чтобы он добавил курсы или уточните позже.",
            Message::KnowledgeUnavailable => "Информация об академии временно недоступна.",
            Message::VoiceProcessing => "Пожалуйста, подождите, я анализирую ваше голосовое сообщение...",
            Message::AudioFailed => "Извините, произошла ошибка при обработке вашего голосового сообщения. Пожалуйста, попробуйте еще раз или напишите мне.",
            Message::AudioNotUnderstood => "Извините, не удалось распознать речь в вашем сообщении. Пожалуйста, повторите или напишите мне.",
            Message::OffTopicExample => "К сожалению, я не могу помочь с этим вопросом, но могу рассказать о наших курсах в IT Run Academy. У нас есть отличные программы, которые могут вас заинтересовать. Хотите, чтобы я рассказала подробнее?",
            Message::EnrollmentExample => "Отлично! Чтобы записаться или получить подробную консультацию, пожалуйста, заполните эту форму: [ссылка на форму]. Также Вы можете лично посетить нашу академию по адресу: [Адрес академии из базы знаний]. Мы работаем [График работы из базы знаний]. Будем рады Вас видеть!",
            Message::NoInfoExample => "Извините, у меня нет точной информации по вашему вопросу прямо сейчас, или я не нашла такой курс. Чтобы наши менеджеры могли связаться с вами и предоставить подробную информацию, пожалуйста, заполните эту форму: [ссылка на форму].",
            Message::TrialLessonExample => "Также приглашаем вас на наш бесплатный пробный урок, который проводится каждую субботу. Это отличная возможность познакомиться с нами ближе!",
            Message::PostConsultationExample => "Если вы хотите записаться, пожалуйста, скажите об этом.",
            Message::CooperationExample => "По вопросам сотрудничества или практики, пожалуйста, свяжитесь с нашим менеджером по номеру: [номер менеджера].",
            Message::UnspecifiedDescription => "Описание отсутствует.",
            Message::UnspecifiedPrice => "Цена не указана.",
            Message::UnspecifiedDuration => "Продолжительность не указана.",
            Message::UnspecifiedSchedule => "График не указан.",
            Message::UnspecifiedAge => "Возраст не указан.",
        }
    }

    fn kyrgyz(&self) -> &'static str {
        match self {
            Message::Welcome => "Салам! Мен IT Run Academyнин виртуалдык менеджеримин. Мен сизге курстарыбыз жана мүмкүнчүлүктөрүбүз жөнүндө маалымат берүүгө даярмын. Кантип жардам бере алам?",
            Message::CourseDataError => "Эскертүү: Курстар жөнүндө маалымат жүктөлбөй калды. Мен жалпы билимдин негизинде жооп берем, бирок курстар жөнүндө так маалымат жеткиликсиз болушу мүмкүн.",
            Message::RateLimited => "Кечиресиз, суроо-талаптар көп. Бир аз күтүңүз.",
            Message::AuthFailed => "Кечиресиз, аутентификация катасы кетти. Администраторго билдириңиз.",
            Message::TimedOut => "Кечиресиз, серверге суроо-талап узак убакытты алды. Кайра аракет кылыңыз.",
            Message::UnknownError => "Кечиресиз, ички ката кетти. Кайра аракет кылыңыз же колдоо кызматына кайрылыңыз.",
            Message::NoCourseInfo => "Курстар жөнүндө маалымат толук жеткиликсиз. Администраторго билдириңиз же кийинчерээк тактаңыз.",
            Message::KnowledgeUnavailable => "Академия жөнүндө маалымат убактылуу жеткиликсиз.",
            Message::VoiceProcessing => "Сураныч, күтө туруңуз, үн билдирүүңүздү талдап жатам...",
            Message::AudioFailed => "Кечиресиз, үн билдирүүңүздү иштетүүдө ката кетти. Сураныч, кайра аракет кылыңыз же жазып жибериңиз.",
            Message::AudioNotUnderstood => "Кечиресиз, билдирүүңүздөгү сөздү тааный алган жокмун. Сураныч, кайталаңыз же жазып жибериңиз.",
            Message::OffTopicExample => "Кечиресиз, бул суроого жардам бере албайм, бирок IT Run Academyдеги курстарыбыз жөнүндө айта алам. Бизде сизди кызыктыра турган сонун программалар бар. Кененирээк айтып берейинби?",
            Message::EnrollmentExample => "Абдан сонун! Катталуу же кененирээк кеңеш алуу үчүн, сураныч, бул форманы толтуруңуз: [форманын шилтемеси]. Ошондой эле сиз биздин академияга жеке өзүңүз келип кайрылсаңыз болот: [Академиянын дареги базадан]. Биз [Иш убактысы базадан] иштейбиз. Сизди күтөбүз!",
            Message::NoInfoExample => "Кечиресиз, учурда менин сурооңуз боюнча так маалыматым жок, же мен андай курсту тапкан жокмун. Биздин менеджерлер сизге байланышып, толук маалымат бере алышы үчүн, сураныч, бул форманы толтуруңуз: [форманын шилтемеси].",
            Message::TrialLessonExample => "Ошондой эле сизди ар ишемби сайын өтүүчү акысыз сыноо сабагыбызга чакырабыз. Бул биз менен жакындан таанышууга эң сонун мүмкүнчүлүк!",
            Message::PostConsultationExample => "Эгер сиз жазылгыңыз келсе, айтыңыз.",
            Message::CooperationExample => "Кызматташуу же практика боюнча суроолор үчүн, биздин менеджер менен бул номер аркылуу байланышыңыз: [менеджердин номери].",
            Message::UnspecifiedDescription => "Сүрөттөмө жок.",
            Message::UnspecifiedPrice => "Баасы көрсөтүлгөн эмес.",
            Message::UnspecifiedDuration => "Узактыгы көрсөтүлгөн эмес.",
            Message::UnspecifiedSchedule => "График көрсөтүлгөн эмес.",
            Message::UnspecifiedAge => "Жашы көрсөтүлгөн эмес.",
        }
    }
}
