//! Health topics and small talk recognised in user messages.
//!
//! Single-word terms match whole words (a trailing plural `s` is
//! tolerated); multi-word terms match as substrings of the lowercased
//! message.

/// Whether `term` occurs in `text` under the matching rules above.
pub fn mentions(text: &str, term: &str) -> bool {
    let lower = text.to_lowercase();
    if term.contains(' ') {
        return lower.contains(term);
    }
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == term || word.strip_suffix('s') == Some(term))
}

pub fn mentions_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| mentions(text, term))
}

/// Health topics with a quick guide appended to template replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthTopic {
    ColdAndCough,
    Flu,
    Fever,
    Heart,
    Diabetes,
    Allergy,
    Stomach,
    Urinary,
    MentalHealth,
    Skin,
    Headache,
    BackPain,
    Nutrition,
    Exercise,
    Medication,
}

impl HealthTopic {
    /// Detection order; the first match wins.
    pub const ALL: [HealthTopic; 15] = [
        HealthTopic::ColdAndCough,
        HealthTopic::Flu,
        HealthTopic::Fever,
        HealthTopic::Heart,
        HealthTopic::Diabetes,
        HealthTopic::Allergy,
        HealthTopic::Stomach,
        HealthTopic::Urinary,
        HealthTopic::MentalHealth,
        HealthTopic::Skin,
        HealthTopic::Headache,
        HealthTopic::BackPain,
        HealthTopic::Nutrition,
        HealthTopic::Exercise,
        HealthTopic::Medication,
    ];

    pub fn terms(&self) -> &'static [&'static str] {
        match self {
            HealthTopic::ColdAndCough => &["cold", "cough"],
            HealthTopic::Flu => &["flu", "influenza"],
            HealthTopic::Fever => &["fever"],
            HealthTopic::Heart => &["heart", "cardiac", "chest pain", "hypertension"],
            HealthTopic::Diabetes => &["diabetes", "blood sugar", "insulin"],
            HealthTopic::Allergy => &["allergy", "allergies", "hay fever", "pollen"],
            HealthTopic::Stomach => &[
                "stomach",
                "food poisoning",
                "gastroenteritis",
                "diarrhea",
                "vomiting",
            ],
            HealthTopic::Urinary => &["uti", "urinary", "bladder", "kidney"],
            HealthTopic::MentalHealth => &["mental", "anxiety", "depression", "stress"],
            HealthTopic::Skin => &["skin", "eczema", "acne", "dermatitis", "rash"],
            HealthTopic::Headache => &["headache", "migraine", "head pain"],
            HealthTopic::BackPain => &["back pain", "backache", "spine", "muscle pain"],
            HealthTopic::Nutrition => &["diet", "nutrition", "food", "eating"],
            HealthTopic::Exercise => &["exercise", "workout", "fitness", "physical activity"],
            HealthTopic::Medication => &["medicine", "medication", "drug", "pill"],
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            HealthTopic::ColdAndCough => "Colds and coughs",
            HealthTopic::Flu => "Flu",
            HealthTopic::Fever => "Fever",
            HealthTopic::Heart => "Heart health",
            HealthTopic::Diabetes => "Diabetes",
            HealthTopic::Allergy => "Allergies",
            HealthTopic::Stomach => "Stomach upsets",
            HealthTopic::Urinary => "Urinary health",
            HealthTopic::MentalHealth => "Mental health",
            HealthTopic::Skin => "Skin care",
            HealthTopic::Headache => "Headaches",
            HealthTopic::BackPain => "Back pain",
            HealthTopic::Nutrition => "Nutrition",
            HealthTopic::Exercise => "Exercise",
            HealthTopic::Medication => "Medication safety",
        }
    }

    pub fn tips(&self) -> &'static [&'static str] {
        match self {
            HealthTopic::ColdAndCough => &[
                "Rest and drink warm fluids",
                "Honey or lozenges can soothe a sore throat",
                "See a doctor if a cough lasts more than three weeks",
            ],
            HealthTopic::Flu => &[
                "Stay home and rest until the fever has been gone for a day",
                "Antivirals work best when started within two days",
                "A yearly flu vaccine is the best protection",
            ],
            HealthTopic::Fever => &[
                "Drink plenty of fluids and dress lightly",
                "Fever reducers can ease discomfort",
                "Seek care for a fever above 39.4 C or one lasting over three days",
            ],
            HealthTopic::Heart => &[
                "Chest pain with shortness of breath needs emergency care",
                "Check your blood pressure regularly",
                "Limit salt and stay active most days",
            ],
            HealthTopic::Diabetes => &[
                "Monitor blood sugar as your care team advises",
                "Favour whole grains, vegetables and lean protein",
                "Have yearly eye and foot checks",
            ],
            HealthTopic::Allergy => &[
                "Check pollen forecasts and keep windows closed on high days",
                "Antihistamines and nasal sprays relieve most symptoms",
                "Shower after spending time outdoors",
            ],
            HealthTopic::Stomach => &[
                "Sip water or oral rehydration solution often",
                "Return to bland food as appetite comes back",
                "Seek care for blood in the stool or signs of dehydration",
            ],
            HealthTopic::Urinary => &[
                "Drink plenty of water",
                "Most infections need antibiotics from a clinician",
                "Fever or back pain may mean a kidney infection",
            ],
            HealthTopic::MentalHealth => &[
                "Keep a regular sleep and activity routine",
                "Talk to someone you trust or a professional",
                "In a crisis, contact a crisis line or emergency services",
            ],
            HealthTopic::Skin => &[
                "Moisturise daily with fragrance-free products",
                "Avoid known irritants and hot showers",
                "See a doctor for a rash that spreads fast or looks infected",
            ],
            HealthTopic::Headache => &[
                "Rest in a dark, quiet room and drink water",
                "Keep a diary to spot triggers",
                "A sudden, severe headache needs urgent care",
            ],
            HealthTopic::BackPain => &[
                "Keep moving gently rather than resting in bed",
                "Heat or cold packs can ease pain",
                "Leg numbness or loss of bladder control needs prompt care",
            ],
            HealthTopic::Nutrition => &[
                "Fill half your plate with vegetables and fruit",
                "Choose water over sugary drinks",
                "Limit processed food and added salt",
            ],
            HealthTopic::Exercise => &[
                "Aim for 150 minutes of moderate activity a week",
                "Add muscle strengthening twice a week",
                "Check with a doctor before starting if you have a heart condition",
            ],
            HealthTopic::Medication => &[
                "Take medicines exactly as prescribed",
                "Keep an up-to-date list of everything you take",
                "Ask a pharmacist about interactions",
            ],
        }
    }

    /// Markdown quick guide for the topic.
    pub fn quick_guide(&self) -> String {
        let mut guide = format!("**Quick guide: {}**\n", self.title());
        for tip in self.tips() {
            guide.push_str("- ");
            guide.push_str(tip);
            guide.push('\n');
        }
        guide
    }
}

/// First health topic mentioned in the message.
pub fn detect_topic(message: &str) -> Option<HealthTopic> {
    HealthTopic::ALL
        .into_iter()
        .find(|topic| mentions_any(message, topic.terms()))
}

/// Conversational messages answered with a canned reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmallTalk {
    Greeting,
    Gratitude,
    Wellbeing,
}

impl SmallTalk {
    pub fn terms(&self) -> &'static [&'static str] {
        match self {
            SmallTalk::Greeting => &[
                "hello",
                "hi",
                "hey",
                "good morning",
                "good afternoon",
                "good evening",
            ],
            SmallTalk::Gratitude => &["thank", "thanks", "appreciate"],
            SmallTalk::Wellbeing => &["how are you", "how do you do"],
        }
    }

    pub fn replies(&self) -> &'static [&'static str] {
        match self {
            SmallTalk::Greeting => &[
                "Hello! I'm your healthcare assistant. How can I help you today?",
                "Hi there! Ask me anything about symptoms, treatments or healthy habits.",
                "Hey! Welcome. How are you feeling today?",
                "Good to see you! What health question is on your mind?",
            ],
            SmallTalk::Gratitude => &[
                "You're welcome! Let me know if anything else comes up.",
                "Glad I could help. Take care of yourself!",
                "Happy to help. Feel free to ask another question any time.",
            ],
            SmallTalk::Wellbeing => &[
                "I'm doing well, thanks for asking! How are you feeling?",
                "All good here and ready to help. How is your health today?",
                "Thanks for asking! More importantly, how are you doing?",
            ],
        }
    }

    /// Reply variant chosen by the number of turns already in the session.
    pub fn reply(&self, turn: usize) -> &'static str {
        let replies = self.replies();
        replies[turn % replies.len()]
    }
}

/// Small talk in the message, unless it also mentions a health topic.
pub fn detect_small_talk(message: &str) -> Option<SmallTalk> {
    if detect_topic(message).is_some() {
        return None;
    }
    [SmallTalk::Greeting, SmallTalk::Gratitude, SmallTalk::Wellbeing]
        .into_iter()
        .find(|kind| mentions_any(message, kind.terms()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentions_whole_words() {
        assert!(mentions("I caught a cold.", "cold"));
        assert!(!mentions("Drink fluids", "flu"));
        assert!(!mentions("which one", "hi"));
        assert!(mentions("Terrible headaches lately", "headache"));
        assert!(mentions("sharp CHEST PAIN", "chest pain"));
    }

    #[test]
    fn test_detect_topic_order() {
        assert_eq!(detect_topic("cold and flu"), Some(HealthTopic::ColdAndCough));
        assert_eq!(detect_topic("my flu with fever"), Some(HealthTopic::Flu));
        assert_eq!(detect_topic("high fever"), Some(HealthTopic::Fever));
        assert_eq!(detect_topic("checking my blood sugar"), Some(HealthTopic::Diabetes));
        assert_eq!(detect_topic("what's the weather"), None);
    }

    #[test]
    fn test_small_talk() {
        assert_eq!(detect_small_talk("Hello!"), Some(SmallTalk::Greeting));
        assert_eq!(detect_small_talk("thanks so much"), Some(SmallTalk::Gratitude));
        assert_eq!(detect_small_talk("How are you today?"), Some(SmallTalk::Wellbeing));
        assert_eq!(detect_small_talk("hi, I have a migraine"), None);
        assert_eq!(detect_small_talk("what helps sleep"), None);
    }

    #[test]
    fn test_reply_rotates() {
        let first = SmallTalk::Greeting.reply(0);
        let second = SmallTalk::Greeting.reply(1);
        assert_ne!(first, second);
        assert_eq!(SmallTalk::Greeting.reply(4), first);
    }

    #[test]
    fn test_quick_guide_lists_tips() {
        let guide = HealthTopic::Flu.quick_guide();
        assert!(guide.starts_with("**Quick guide: Flu**"));
        assert_eq!(guide.matches("\n- ").count(), 3);
    }
}
