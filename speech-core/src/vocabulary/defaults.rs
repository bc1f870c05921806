use super::{BilingualLabel, Category, CategoryId, QuickPhrase, Word};

use CategoryId::*;

/// (id, English, French, category, hidden by default)
const DEFAULT_WORDS: &[(&str, &str, &str, CategoryId, bool)] = &[
    // Social
    ("yes", "yes", "oui", Social, false),
    ("no", "no", "non", Social, false),
    ("hi", "hi", "salut", Social, false),
    ("bye", "bye", "au revoir", Social, false),
    ("please", "please", "s'il te plaît", Social, false),
    ("thank_you", "thank you", "merci", Social, false),
    ("help", "help", "aide", Social, false),
    ("sorry", "sorry", "pardon", Social, true),
    ("love", "love", "amour", Social, true),
    ("good_morning", "good morning", "bonjour", Social, true),
    ("good_night", "good night", "bonne nuit", Social, true),

    // People
    ("mom", "mom", "maman", People, false),
    ("dad", "dad", "papa", People, false),
    ("me", "me", "moi", People, false),
    ("you", "you", "toi", People, false),
    ("brother", "brother", "frère", People, true),
    ("sister", "sister", "sœur", People, true),
    ("friend", "friend", "ami", People, true),
    ("teacher", "teacher", "enseignant", People, true),
    ("baby", "baby", "bébé", People, true),
    ("grandma", "grandma", "mamie", People, true),
    ("grandpa", "grandpa", "papi", People, true),

    // Actions
    ("want", "want", "vouloir", Actions, false),
    ("go", "go", "aller", Actions, false),
    ("stop", "stop", "arrêter", Actions, false),
    ("more", "more", "encore", Actions, false),
    ("eat", "eat", "manger", Actions, false),
    ("drink", "drink", "boire", Actions, false),
    ("play", "play", "jouer", Actions, false),
    ("give", "give", "donner", Actions, true),
    ("make", "make", "faire", Actions, true),
    ("look", "look", "regarder", Actions, true),
    ("sleep", "sleep", "dormir", Actions, true),
    ("come", "come", "venir", Actions, true),
    ("wait", "wait", "attendre", Actions, true),
    ("open", "open", "ouvrir", Actions, true),
    ("close", "close", "fermer", Actions, true),
    ("read", "read", "lire", Actions, true),
    ("sing", "sing", "chanter", Actions, true),
    ("dance", "dance", "danser", Actions, true),
    ("hug", "hug", "câlin", Actions, true),
    ("wash", "wash", "laver", Actions, true),

    // Feelings
    ("happy", "happy", "content", Feelings, false),
    ("sad", "sad", "triste", Feelings, false),
    ("angry", "angry", "en colère", Feelings, false),
    ("tired", "tired", "fatigué", Feelings, false),
    ("scared", "scared", "peur", Feelings, false),
    ("sick", "sick", "malade", Feelings, true),
    ("hungry", "hungry", "faim", Feelings, true),
    ("thirsty", "thirsty", "soif", Feelings, true),
    ("excited", "excited", "excité", Feelings, true),
    ("bored", "bored", "ennuyé", Feelings, true),
    ("hurt", "hurt", "mal", Feelings, true),

    // Descriptors
    ("big", "big", "grand", Descriptors, false),
    ("little", "little", "petit", Descriptors, false),
    ("hot", "hot", "chaud", Descriptors, false),
    ("cold", "cold", "froid", Descriptors, false),
    ("good", "good", "bon", Descriptors, true),
    ("bad", "bad", "mauvais", Descriptors, true),
    ("fast", "fast", "vite", Descriptors, true),
    ("slow", "slow", "lent", Descriptors, true),
    ("up", "up", "en haut", Descriptors, true),
    ("down", "down", "en bas", Descriptors, true),
    ("all_done", "all done", "fini", Descriptors, true),
    ("same", "same", "pareil", Descriptors, true),
    ("different", "different", "différent", Descriptors, true),
    ("new", "new", "nouveau", Descriptors, true),

    // Questions
    ("what", "what", "quoi", Questions, false),
    ("where", "where", "où", Questions, false),
    ("who", "who", "qui", Questions, true),
    ("when", "when", "quand", Questions, true),
    ("why", "why", "pourquoi", Questions, true),
    ("how", "how", "comment", Questions, true),

    // Food
    ("apple", "apple", "pomme", Food, true),
    ("banana", "banana", "banane", Food, true),
    ("cookie", "cookie", "biscuit", Food, true),
    ("bread", "bread", "pain", Food, true),
    ("cheese", "cheese", "fromage", Food, true),
    ("water", "water", "eau", Food, true),
    ("milk", "milk", "lait", Food, true),
    ("juice", "juice", "jus", Food, true),
    ("chicken", "chicken", "poulet", Food, true),
    ("pasta", "pasta", "pâtes", Food, true),
    ("rice", "rice", "riz", Food, true),
    ("yogurt", "yogurt", "yaourt", Food, true),

    // Places
    ("home", "home", "maison", Places, true),
    ("school", "school", "école", Places, true),
    ("park", "park", "parc", Places, true),
    ("bathroom", "bathroom", "salle de bain", Places, true),
    ("outside", "outside", "dehors", Places, true),
    ("bed", "bed", "lit", Places, true),
    ("car_place", "car", "voiture", Places, true),
    ("store", "store", "magasin", Places, true),

    // Objects
    ("book", "book", "livre", Objects, true),
    ("ball", "ball", "ballon", Objects, true),
    ("phone", "phone", "téléphone", Objects, true),
    ("tv", "TV", "télé", Objects, true),
    ("toy", "toy", "jouet", Objects, true),
    ("shoes", "shoes", "chaussures", Objects, true),
    ("hat", "hat", "chapeau", Objects, true),
    ("blanket", "blanket", "couverture", Objects, true),

    // Body
    ("head", "head", "tête", Body, true),
    ("hand", "hand", "main", Body, true),
    ("mouth", "mouth", "bouche", Body, true),
    ("eyes", "eyes", "yeux", Body, true),
    ("ears", "ears", "oreilles", Body, true),
    ("tummy", "tummy", "ventre", Body, true),
    ("feet", "feet", "pieds", Body, true),

    // Time
    ("now", "now", "maintenant", Time, true),
    ("later", "later", "plus tard", Time, true),
    ("today", "today", "aujourd'hui", Time, true),
    ("tomorrow", "tomorrow", "demain", Time, true),
    ("morning", "morning", "matin", Time, true),
    ("night", "night", "nuit", Time, true),
];

const DEFAULT_CATEGORIES: &[(CategoryId, &str, &str)] = &[
    (Social, "Social", "Social"),
    (People, "People", "Personnes"),
    (Actions, "Actions", "Actions"),
    (Feelings, "Feelings", "Émotions"),
    (Descriptors, "Descriptors", "Descripteurs"),
    (Questions, "Questions", "Questions"),
    (Food, "Food", "Nourriture"),
    (Places, "Places", "Lieux"),
    (Objects, "Objects", "Objets"),
    (Body, "Body", "Corps"),
    (Time, "Time", "Temps"),
];

const DEFAULT_QUICK_PHRASES: &[(&str, &str, &str)] = &[
    ("phrase_need_break", "I need a break", "J'ai besoin d'une pause"),
    ("phrase_can_have_more", "Can I have more?", "Est-ce que je peux en avoir plus?"),
    ("phrase_dont_like", "I don't like that", "Je n'aime pas ça"),
    ("phrase_play_together", "Let's play together", "Jouons ensemble"),
    ("phrase_help_me", "Help me please", "Aide-moi s'il te plaît"),
    ("phrase_i_love_you", "I love you", "Je t'aime"),
    ("phrase_im_hungry", "I'm hungry", "J'ai faim"),
    ("phrase_im_thirsty", "I'm thirsty", "J'ai soif"),
    ("phrase_need_bathroom", "I need the bathroom", "J'ai besoin d'aller aux toilettes"),
    ("phrase_im_scared", "I'm scared", "J'ai peur"),
    ("phrase_wait_please", "Wait please", "Attends s'il te plaît"),
    ("phrase_my_turn", "It's my turn", "C'est mon tour"),
];

pub(super) fn default_words() -> Vec<Word> {
    DEFAULT_WORDS
        .iter()
        .filter_map(|&(id, en, fr, category, hidden)| {
            match Word::new(id, BilingualLabel::new(en, fr), category) {
                Ok(word) => Some(word.hidden_by_default(hidden)),
                Err(err) => {
                    log::error!("Skipping default word: {err}");
                    None
                }
            }
        })
        .collect()
}

pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|&(id, en, fr)| Category {
            id,
            label: BilingualLabel::new(en, fr),
        })
        .collect()
}

pub fn default_quick_phrases() -> Vec<QuickPhrase> {
    DEFAULT_QUICK_PHRASES
        .iter()
        .map(|&(id, en, fr)| QuickPhrase {
            id: id.to_string(),
            label: BilingualLabel::new(en, fr),
        })
        .collect()
}
